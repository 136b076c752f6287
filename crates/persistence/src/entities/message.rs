//! Message entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{DeliveryState, MessageStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for delivery_state that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_state", rename_all = "lowercase")]
pub enum DeliveryStateDb {
    Delivered,
    Queued,
}

impl From<DeliveryStateDb> for DeliveryState {
    fn from(db_state: DeliveryStateDb) -> Self {
        match db_state {
            DeliveryStateDb::Delivered => DeliveryState::Delivered,
            DeliveryStateDb::Queued => DeliveryState::Queued,
        }
    }
}

impl From<DeliveryState> for DeliveryStateDb {
    fn from(state: DeliveryState) -> Self {
        match state {
            DeliveryState::Delivered => DeliveryStateDb::Delivered,
            DeliveryState::Queued => DeliveryStateDb::Queued,
        }
    }
}

/// Database enum for message_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
pub enum MessageStatusDb {
    Draft,
    Sent,
}

impl From<MessageStatusDb> for MessageStatus {
    fn from(db_status: MessageStatusDb) -> Self {
        match db_status {
            MessageStatusDb::Draft => MessageStatus::Draft,
            MessageStatusDb::Sent => MessageStatus::Sent,
        }
    }
}

impl From<MessageStatus> for MessageStatusDb {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Draft => MessageStatusDb::Draft,
            MessageStatus::Sent => MessageStatusDb::Sent,
        }
    }
}

/// Database row mapping for the messages table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    pub body: String,
    pub attachments: Vec<String>,
    pub status: MessageStatusDb,
    pub delivery_state: DeliveryStateDb,
    pub unread: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub attendee_id: Option<Uuid>,
    pub invite_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for domain::models::Message {
    fn from(entity: MessageEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            title: entity.title,
            body: entity.body,
            attachments: entity.attachments,
            status: entity.status.into(),
            delivery_state: entity.delivery_state.into(),
            unread: entity.unread,
            delivered_at: entity.delivered_at,
            attendee_id: entity.attendee_id,
            invite_id: entity.invite_id,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(state: DeliveryStateDb) -> MessageEntity {
        MessageEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            title: "Doors open".to_string(),
            body: "Doors open at 18:00".to_string(),
            attachments: vec!["files/map.pdf".to_string()],
            status: MessageStatusDb::Sent,
            delivery_state: state,
            unread: true,
            delivered_at: None,
            attendee_id: None,
            invite_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_entity_conversion() {
        let row = entity(DeliveryStateDb::Queued);
        let invite_id = row.invite_id;
        let message: domain::models::Message = row.into();

        assert_eq!(message.delivery_state, DeliveryState::Queued);
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.invite_id, invite_id);
        assert_eq!(message.attachments, vec!["files/map.pdf".to_string()]);
        assert!(message.satisfies_delivery_invariants());
    }

    #[test]
    fn test_delivery_state_conversion() {
        assert_eq!(
            DeliveryStateDb::from(DeliveryState::Delivered),
            DeliveryStateDb::Delivered
        );
        assert_eq!(
            DeliveryState::from(DeliveryStateDb::Queued),
            DeliveryState::Queued
        );
    }
}

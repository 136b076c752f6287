//! Message domain models.
//!
//! A message is addressed to exactly one recipient: an attendee (delivered
//! immediately) or an invite (queued until the invite is accepted).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::MessagingError;

/// Whether a message is visible to its recipient yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Delivered,
    Queued,
}

impl std::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryState::Delivered => write!(f, "delivered"),
            DeliveryState::Queued => write!(f, "queued"),
        }
    }
}

/// Lifecycle status of a message, orthogonal to delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Draft,
    #[default]
    Sent,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageStatus::Draft => write!(f, "draft"),
            MessageStatus::Sent => write!(f, "sent"),
        }
    }
}

/// Which subset of an event's people a broadcast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudienceSelector {
    #[default]
    All,
    Invited,
    Accepted,
}

impl std::fmt::Display for AudienceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudienceSelector::All => write!(f, "all"),
            AudienceSelector::Invited => write!(f, "invited"),
            AudienceSelector::Accepted => write!(f, "accepted"),
        }
    }
}

/// The single recipient a message record is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    Attendee(Uuid),
    Invite(Uuid),
}

impl Recipient {
    /// Attendees have accounts and get the message right away; invites wait.
    pub fn delivery_state(&self) -> DeliveryState {
        match self {
            Recipient::Attendee(_) => DeliveryState::Delivered,
            Recipient::Invite(_) => DeliveryState::Queued,
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::Attendee(id) => write!(f, "attendee:{}", id),
            Recipient::Invite(id) => write!(f, "invite:{}", id),
        }
    }
}

/// Who a create-message request is aimed at, resolved once from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientTarget {
    /// One attendee already known to have an account.
    Direct(Uuid),
    /// One invite whose message waits for acceptance.
    Deferred(Uuid),
    /// Every recipient the audience selector resolves to.
    Broadcast(AudienceSelector),
}

/// Content shared by every record of one fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub title: String,
    pub body: String,
    pub attachments: Vec<String>,
    pub status: MessageStatus,
}

/// A message record about to be written.
///
/// Construction derives the delivery state and delivery timestamp from the
/// recipient, so a queued record can never carry an attendee.
#[derive(Debug, Clone)]
pub struct NewMessage {
    event_id: Uuid,
    content: MessageContent,
    recipient: Recipient,
    delivered_at: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn new(
        event_id: Uuid,
        content: MessageContent,
        recipient: Recipient,
        now: DateTime<Utc>,
    ) -> Self {
        let delivered_at = match recipient {
            Recipient::Attendee(_) => Some(now),
            Recipient::Invite(_) => None,
        };
        Self {
            event_id,
            content,
            recipient,
            delivered_at,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn recipient(&self) -> Recipient {
        self.recipient
    }

    pub fn delivery_state(&self) -> DeliveryState {
        self.recipient.delivery_state()
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn attendee_id(&self) -> Option<Uuid> {
        match self.recipient {
            Recipient::Attendee(id) => Some(id),
            Recipient::Invite(_) => None,
        }
    }

    pub fn invite_id(&self) -> Option<Uuid> {
        match self.recipient {
            Recipient::Invite(id) => Some(id),
            Recipient::Attendee(_) => None,
        }
    }
}

/// A persisted message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    pub body: String,
    pub attachments: Vec<String>,
    pub status: MessageStatus,
    pub delivery_state: DeliveryState,
    pub unread: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub attendee_id: Option<Uuid>,
    /// Kept after promotion so a delivered message still records the invite it waited on.
    pub invite_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_delivered(&self) -> bool {
        self.delivery_state == DeliveryState::Delivered
    }

    /// Checks the delivery-state invariants:
    /// queued messages carry an invite and no attendee, delivered messages
    /// carry an attendee and a delivery timestamp.
    pub fn satisfies_delivery_invariants(&self) -> bool {
        match self.delivery_state {
            DeliveryState::Queued => {
                self.invite_id.is_some() && self.attendee_id.is_none() && self.delivered_at.is_none()
            }
            DeliveryState::Delivered => self.attendee_id.is_some() && self.delivered_at.is_some(),
        }
    }
}

/// Request to create a message (direct, deferred, or broadcast).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateMessageRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 10000, message = "Body must be 1-10000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub body: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_attachment_refs"))]
    pub attachments: Vec<String>,

    pub status: Option<MessageStatus>,

    /// Ignored when an explicit recipient is given.
    pub audience: Option<AudienceSelector>,

    pub attendee_id: Option<Uuid>,

    pub invite_id: Option<Uuid>,
}

impl CreateMessageRequest {
    /// Resolves the optional recipient fields into a single target.
    pub fn recipient_target(&self) -> Result<RecipientTarget, MessagingError> {
        match (self.attendee_id, self.invite_id) {
            (Some(_), Some(_)) => Err(MessagingError::InvalidRecipientSpecification(
                "attendee_id and invite_id cannot both be set".to_string(),
            )),
            (Some(attendee_id), None) => Ok(RecipientTarget::Direct(attendee_id)),
            (None, Some(invite_id)) => Ok(RecipientTarget::Deferred(invite_id)),
            (None, None) => Ok(RecipientTarget::Broadcast(
                self.audience.unwrap_or_default(),
            )),
        }
    }

    /// Splits the request into shared content and its recipient target.
    pub fn into_parts(self) -> Result<(MessageContent, RecipientTarget), MessagingError> {
        let target = self.recipient_target()?;
        let content = MessageContent {
            title: self.title,
            body: self.body,
            attachments: self.attachments,
            status: self.status.unwrap_or_default(),
        };
        Ok((content, target))
    }
}

/// Response after creating a message.
///
/// `message` is the first record written; it is `None` when the audience was empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateMessageResponse {
    pub message: Option<Message>,
    pub delivered: usize,
    pub queued: usize,
    pub failed: usize,
}

/// Query parameters for listing visible messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMessagesQuery {
    pub attendee_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub unread_only: Option<bool>,
}

/// Response for listing visible messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMessagesResponse {
    pub data: Vec<Message>,
    pub next_cursor: Option<String>,
}

/// Request to mark a message as read by its recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MarkReadRequest {
    pub attendee_id: Uuid,
}

/// Unread message count for one attendee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UnreadCountResponse {
    pub attendee_id: Uuid,
    pub unread: u64,
}

/// Request from the acceptance workflow to release an invite's queued messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromoteQueuedRequest {
    pub attendee_id: Uuid,
}

/// Result of a promotion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromoteQueuedResponse {
    pub invite_id: Uuid,
    pub attendee_id: Uuid,
    pub promoted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateMessageRequest {
        CreateMessageRequest {
            title: "Schedule change".to_string(),
            body: "Doors open at 9:30 instead of 9:00.".to_string(),
            attachments: vec![],
            status: None,
            audience: None,
            attendee_id: None,
            invite_id: None,
        }
    }

    #[test]
    fn test_recipient_delivery_state() {
        assert_eq!(
            Recipient::Attendee(Uuid::nil()).delivery_state(),
            DeliveryState::Delivered
        );
        assert_eq!(
            Recipient::Invite(Uuid::nil()).delivery_state(),
            DeliveryState::Queued
        );
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(DeliveryState::Queued.to_string(), "queued");
        assert_eq!(MessageStatus::Sent.to_string(), "sent");
        assert_eq!(AudienceSelector::Accepted.to_string(), "accepted");
        assert_eq!(
            Recipient::Invite(Uuid::nil()).to_string(),
            "invite:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_recipient_target_defaults_to_broadcast_all() {
        assert_eq!(
            request().recipient_target().unwrap(),
            RecipientTarget::Broadcast(AudienceSelector::All)
        );
    }

    #[test]
    fn test_recipient_target_direct_ignores_audience() {
        let attendee_id = Uuid::new_v4();
        let req = CreateMessageRequest {
            attendee_id: Some(attendee_id),
            audience: Some(AudienceSelector::Invited),
            ..request()
        };
        assert_eq!(
            req.recipient_target().unwrap(),
            RecipientTarget::Direct(attendee_id)
        );
    }

    #[test]
    fn test_recipient_target_deferred() {
        let invite_id = Uuid::new_v4();
        let req = CreateMessageRequest {
            invite_id: Some(invite_id),
            ..request()
        };
        assert_eq!(
            req.recipient_target().unwrap(),
            RecipientTarget::Deferred(invite_id)
        );
    }

    #[test]
    fn test_recipient_target_rejects_both_ids() {
        let req = CreateMessageRequest {
            attendee_id: Some(Uuid::new_v4()),
            invite_id: Some(Uuid::new_v4()),
            ..request()
        };
        assert!(matches!(
            req.recipient_target(),
            Err(MessagingError::InvalidRecipientSpecification(_))
        ));
    }

    #[test]
    fn test_into_parts_defaults_status_to_sent() {
        let (content, _) = request().into_parts().unwrap();
        assert_eq!(content.status, MessageStatus::Sent);
        assert_eq!(content.title, "Schedule change");
    }

    #[test]
    fn test_new_message_for_attendee_is_delivered() {
        let now = Utc::now();
        let attendee_id = Uuid::new_v4();
        let (content, _) = request().into_parts().unwrap();
        let message = NewMessage::new(Uuid::new_v4(), content, Recipient::Attendee(attendee_id), now);

        assert_eq!(message.delivery_state(), DeliveryState::Delivered);
        assert_eq!(message.delivered_at(), Some(now));
        assert_eq!(message.attendee_id(), Some(attendee_id));
        assert_eq!(message.invite_id(), None);
    }

    #[test]
    fn test_new_message_for_invite_is_queued() {
        let invite_id = Uuid::new_v4();
        let (content, _) = request().into_parts().unwrap();
        let message = NewMessage::new(Uuid::new_v4(), content, Recipient::Invite(invite_id), Utc::now());

        assert_eq!(message.delivery_state(), DeliveryState::Queued);
        assert_eq!(message.delivered_at(), None);
        assert_eq!(message.attendee_id(), None);
        assert_eq!(message.invite_id(), Some(invite_id));
    }

    #[test]
    fn test_create_request_validation() {
        assert!(request().validate().is_ok());

        let blank_title = CreateMessageRequest {
            title: "   ".to_string(),
            ..request()
        };
        assert!(blank_title.validate().is_err());

        let empty_body = CreateMessageRequest {
            body: String::new(),
            ..request()
        };
        assert!(empty_body.validate().is_err());

        let long_title = CreateMessageRequest {
            title: "x".repeat(201),
            ..request()
        };
        assert!(long_title.validate().is_err());

        let blank_attachment = CreateMessageRequest {
            attachments: vec!["".to_string()],
            ..request()
        };
        assert!(blank_attachment.validate().is_err());
    }

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{"title":"Hi","body":"Welcome","audience":"invited"}"#;
        let req: CreateMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.audience, Some(AudienceSelector::Invited));
        assert!(req.attachments.is_empty());
        assert!(req.attendee_id.is_none());
    }

    #[test]
    fn test_message_invariants() {
        let now = Utc::now();
        let mut message = Message {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            title: "t".to_string(),
            body: "b".to_string(),
            attachments: vec![],
            status: MessageStatus::Sent,
            delivery_state: DeliveryState::Queued,
            unread: true,
            delivered_at: None,
            attendee_id: None,
            invite_id: Some(Uuid::new_v4()),
            created_at: now,
        };
        assert!(message.satisfies_delivery_invariants());
        assert!(!message.is_delivered());

        message.attendee_id = Some(Uuid::new_v4());
        assert!(!message.satisfies_delivery_invariants());

        message.delivery_state = DeliveryState::Delivered;
        message.delivered_at = Some(now);
        assert!(message.satisfies_delivery_invariants());
        assert!(message.is_delivered());
    }
}

//! Postgres-backed [`MessageStore`].

use chrono::{DateTime, Utc};
use domain::models::{Attendee, Invite, Message, NewMessage};
use domain::services::{MessageFilter, MessageStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::record_pool_metrics;
use crate::repositories::{
    AttendeeRepository, EventRepository, InviteRepository, MessageInput, MessageListQuery,
    MessageRepository,
};

/// Postgres error codes reported as constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Record store backed by the application database.
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
    events: EventRepository,
    attendees: AttendeeRepository,
    invites: InviteRepository,
    messages: MessageRepository,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            attendees: AttendeeRepository::new(pool.clone()),
            invites: InviteRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn events(&self) -> &EventRepository {
        &self.events
    }

    pub fn attendees(&self) -> &AttendeeRepository {
        &self.attendees
    }

    pub fn invites(&self) -> &InviteRepository {
        &self.invites
    }
}

/// Map a sqlx error, separating constraint violations from other failures.
fn map_db_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code();
        if matches!(
            code.as_deref(),
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) | Some(CHECK_VIOLATION)
        ) {
            return StoreError::Constraint(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait::async_trait]
impl MessageStore for PgMessageStore {
    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn event_exists(&self, event_id: Uuid) -> Result<bool, StoreError> {
        self.events.exists(event_id).await.map_err(map_db_error)
    }

    async fn find_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError> {
        let entity = self
            .attendees
            .find_by_id(attendee_id)
            .await
            .map_err(map_db_error)?;
        Ok(entity.map(Into::into))
    }

    async fn find_invite(&self, invite_id: Uuid) -> Result<Option<Invite>, StoreError> {
        let entity = self
            .invites
            .find_by_id(invite_id)
            .await
            .map_err(map_db_error)?;
        Ok(entity.map(Into::into))
    }

    async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>, StoreError> {
        let entities = self
            .attendees
            .list_by_event(event_id)
            .await
            .map_err(map_db_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn list_invites(&self, event_id: Uuid) -> Result<Vec<Invite>, StoreError> {
        let entities = self
            .invites
            .list_by_event(event_id)
            .await
            .map_err(map_db_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let content = message.content();
        let input = MessageInput {
            event_id: message.event_id(),
            title: content.title.clone(),
            body: content.body.clone(),
            attachments: content.attachments.clone(),
            status: content.status.into(),
            delivery_state: message.delivery_state().into(),
            delivered_at: message.delivered_at(),
            attendee_id: message.attendee_id(),
            invite_id: message.invite_id(),
        };
        let entity = self.messages.create(input).await.map_err(map_db_error)?;
        Ok(entity.into())
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError> {
        let entity = self
            .messages
            .find_by_id(message_id)
            .await
            .map_err(map_db_error)?;
        Ok(entity.map(Into::into))
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        let query = MessageListQuery {
            event_id: filter.event_id,
            delivery_state: filter.delivery_state.into(),
            attendee_id: filter.attendee_id,
            unread_only: filter.unread_only,
            cursor_created_at: filter.after.map(|c| c.created_at),
            cursor_id: filter.after.map(|c| c.id),
            limit: filter.limit,
        };
        let entities = self.messages.list(&query).await.map_err(map_db_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn promote_queued(
        &self,
        invite_id: Uuid,
        attendee_id: Uuid,
        delivered_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.messages
            .promote_queued(invite_id, attendee_id, delivered_at)
            .await
            .map_err(map_db_error)
    }

    async fn mark_read(
        &self,
        event_id: Uuid,
        message_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<Option<Message>, StoreError> {
        let entity = self
            .messages
            .mark_read(event_id, message_id, attendee_id)
            .await
            .map_err(map_db_error)?;
        Ok(entity.map(Into::into))
    }

    async fn count_unread(&self, event_id: Uuid, attendee_id: Uuid) -> Result<u64, StoreError> {
        let count = self
            .messages
            .count_unread(event_id, attendee_id)
            .await
            .map_err(map_db_error)?;
        Ok(count.max(0) as u64)
    }
}

//! Record store abstraction.
//!
//! The messaging services only ever talk to storage through [`MessageStore`].
//! Every call is assumed to be transactional on its own and immediately
//! consistent with previous calls.

use chrono::{DateTime, Utc};
use shared::pagination::Cursor;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Attendee, DeliveryState, Invite, Message, NewMessage};

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Selection of messages for a listing, newest first.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    pub event_id: Uuid,
    pub delivery_state: DeliveryState,
    pub attendee_id: Option<Uuid>,
    pub unread_only: bool,
    /// Only rows strictly after this position in `(created_at, id) DESC` order.
    pub after: Option<Cursor>,
    pub limit: Option<i64>,
}

impl MessageFilter {
    pub fn new(event_id: Uuid, delivery_state: DeliveryState) -> Self {
        Self {
            event_id,
            delivery_state,
            attendee_id: None,
            unread_only: false,
            after: None,
            limit: None,
        }
    }

    pub fn for_attendee(mut self, attendee_id: Option<Uuid>) -> Self {
        self.attendee_id = attendee_id;
        self
    }

    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.after = cursor;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a message satisfies every predicate except the limit.
    pub fn matches(&self, message: &Message) -> bool {
        message.event_id == self.event_id
            && message.delivery_state == self.delivery_state
            && self
                .attendee_id
                .map_or(true, |id| message.attendee_id == Some(id))
            && (!self.unread_only || message.unread)
            && self
                .after
                .map_or(true, |c| c.precedes(message.created_at, message.id))
    }
}

/// Storage operations the messaging services depend on.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    /// Check that the store can serve requests.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn event_exists(&self, event_id: Uuid) -> Result<bool, StoreError>;

    async fn find_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError>;

    async fn find_invite(&self, invite_id: Uuid) -> Result<Option<Invite>, StoreError>;

    async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>, StoreError>;

    async fn list_invites(&self, event_id: Uuid) -> Result<Vec<Invite>, StoreError>;

    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError>;

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError>;

    /// Flip every queued message of the invite to delivered for the attendee.
    ///
    /// Must be a single conditional update on `delivery_state = queued` so that
    /// concurrent or repeated calls for the same invite see zero rows.
    async fn promote_queued(
        &self,
        invite_id: Uuid,
        attendee_id: Uuid,
        delivered_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Clear the unread flag of a delivered message owned by the attendee.
    ///
    /// Returns `None` when no delivered message of that event belongs to the attendee.
    async fn mark_read(
        &self,
        event_id: Uuid,
        message_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<Option<Message>, StoreError>;

    async fn count_unread(&self, event_id: Uuid, attendee_id: Uuid) -> Result<u64, StoreError>;
}

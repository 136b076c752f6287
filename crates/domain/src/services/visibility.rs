//! Recipient-facing message reads.
//!
//! Every read here is restricted to delivered messages. This is what keeps
//! content queued for a not-yet-accepted invite out of anyone's inbox.

use shared::pagination::{decode_cursor, encode_cursor};
use std::sync::Arc;
use uuid::Uuid;

use super::store::{MessageFilter, MessageStore};
use crate::error::MessagingError;
use crate::models::{DeliveryState, ListMessagesQuery, Message};

/// Default number of messages per page.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// One page of visible messages, newest first.
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next_cursor: Option<String>,
}

/// Read access to delivered messages.
#[derive(Clone)]
pub struct MessageVisibilityService {
    store: Arc<dyn MessageStore>,
    default_page_size: i64,
    max_page_size: i64,
}

impl MessageVisibilityService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Override the page size bounds (from configuration).
    pub fn with_page_sizes(mut self, default_page_size: i64, max_page_size: i64) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Every delivered message of the event, or of one attendee, newest first.
    pub async fn list_visible_messages(
        &self,
        event_id: Uuid,
        attendee_id: Option<Uuid>,
    ) -> Result<Vec<Message>, MessagingError> {
        self.ensure_event(event_id).await?;
        let filter = visible_filter(event_id).for_attendee(attendee_id);
        Ok(self.store.list_messages(&filter).await?)
    }

    /// A page of delivered messages, newest first.
    pub async fn list_visible_page(
        &self,
        event_id: Uuid,
        query: &ListMessagesQuery,
    ) -> Result<MessagePage, MessagingError> {
        let limit = query.limit.unwrap_or(self.default_page_size);
        if limit < 1 || limit > self.max_page_size {
            return Err(MessagingError::Validation(format!(
                "limit must be between 1 and {}",
                self.max_page_size
            )));
        }
        let cursor = query.cursor.as_deref().map(decode_cursor).transpose()?;

        self.ensure_event(event_id).await?;

        // One extra row tells us whether another page exists.
        let filter = visible_filter(event_id)
            .for_attendee(query.attendee_id)
            .unread_only(query.unread_only.unwrap_or(false))
            .after(cursor)
            .limit(limit.saturating_add(1));
        let mut messages = self.store.list_messages(&filter).await?;

        let has_more = messages.len() > limit as usize;
        if has_more {
            messages.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            messages.last().map(|m| encode_cursor(m.created_at, m.id))
        } else {
            None
        };

        Ok(MessagePage {
            messages,
            next_cursor,
        })
    }

    /// Mark a delivered message as read by its recipient.
    ///
    /// Queued messages and messages of other attendees are reported as not
    /// found, so the response never reveals that queued content exists.
    pub async fn mark_message_read(
        &self,
        event_id: Uuid,
        message_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<Message, MessagingError> {
        self.store
            .mark_read(event_id, message_id, attendee_id)
            .await?
            .ok_or_else(|| MessagingError::NotFound(format!("Message {} not found", message_id)))
    }

    /// Number of delivered, unread messages for an attendee.
    pub async fn unread_count(
        &self,
        event_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<u64, MessagingError> {
        self.ensure_event(event_id).await?;
        Ok(self.store.count_unread(event_id, attendee_id).await?)
    }

    async fn ensure_event(&self, event_id: Uuid) -> Result<(), MessagingError> {
        if self.store.event_exists(event_id).await? {
            Ok(())
        } else {
            Err(MessagingError::NotFound(format!(
                "Event {} not found",
                event_id
            )))
        }
    }
}

fn visible_filter(event_id: Uuid) -> MessageFilter {
    MessageFilter::new(event_id, DeliveryState::Delivered)
}

//! In-memory record store.
//!
//! Used for development (`messaging.store = "memory"`) and by tests. All
//! state sits behind one lock, so each trait call is atomic the same way a
//! single SQL statement is.

use chrono::{DateTime, SubsecRound, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{MessageFilter, MessageStore, StoreError};
use crate::models::{
    Attendee, DeliveryState, Invite, InviteStatus, Message, NewMessage, Recipient,
};

#[derive(Debug, Default)]
struct MemoryState {
    events: HashSet<Uuid>,
    attendees: HashMap<Uuid, Attendee>,
    invites: HashMap<Uuid, Invite>,
    messages: Vec<Message>,
    failing_recipients: HashSet<Recipient>,
    unavailable: bool,
}

impl MemoryState {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Record store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event and return its ID.
    pub async fn create_event(&self) -> Uuid {
        let event_id = Uuid::new_v4();
        self.state.write().await.events.insert(event_id);
        event_id
    }

    /// Create an attendee. Emails are unique per event.
    pub async fn create_attendee(
        &self,
        event_id: Uuid,
        email: &str,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<Attendee, StoreError> {
        let mut state = self.state.write().await;
        let normalized = shared::validation::normalize_email(email);
        let duplicate = state.attendees.values().any(|a| {
            a.event_id == event_id && shared::validation::normalize_email(&a.email) == normalized
        });
        if duplicate {
            return Err(StoreError::Constraint(format!(
                "attendee email {} already exists for event {}",
                email, event_id
            )));
        }

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event_id,
            email: email.to_string(),
            accepted_at,
            created_at: Utc::now(),
        };
        state.attendees.insert(attendee.id, attendee.clone());
        Ok(attendee)
    }

    /// Create an invite for an email.
    pub async fn create_invite(&self, event_id: Uuid, email: &str, status: InviteStatus) -> Invite {
        let invite = Invite {
            id: Uuid::new_v4(),
            event_id,
            email: email.to_string(),
            status,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .invites
            .insert(invite.id, invite.clone());
        invite
    }

    /// Change an invite's status, as the onboarding workflow would.
    pub async fn set_invite_status(
        &self,
        invite_id: Uuid,
        status: InviteStatus,
    ) -> Option<Invite> {
        let mut state = self.state.write().await;
        let invite = state.invites.get_mut(&invite_id)?;
        invite.status = status;
        Some(invite.clone())
    }

    /// Make every subsequent insert addressed to `recipient` fail.
    pub async fn fail_inserts_for(&self, recipient: Recipient) {
        self.state.write().await.failing_recipients.insert(recipient);
    }

    /// Simulate a backend outage.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Snapshot of every stored message, in insertion order.
    pub async fn all_messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.state.read().await.check_available()
    }

    async fn event_exists(&self, event_id: Uuid) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.events.contains(&event_id))
    }

    async fn find_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.attendees.get(&attendee_id).cloned())
    }

    async fn find_invite(&self, invite_id: Uuid) -> Result<Option<Invite>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.invites.get(&invite_id).cloned())
    }

    async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        let mut attendees: Vec<Attendee> = state
            .attendees
            .values()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        attendees.sort_by_key(|a| a.created_at);
        Ok(attendees)
    }

    async fn list_invites(&self, event_id: Uuid) -> Result<Vec<Invite>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        let mut invites: Vec<Invite> = state
            .invites
            .values()
            .filter(|i| i.event_id == event_id)
            .cloned()
            .collect();
        invites.sort_by_key(|i| i.created_at);
        Ok(invites)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut state = self.state.write().await;
        state.check_available()?;
        if state.failing_recipients.contains(&message.recipient()) {
            return Err(StoreError::Unavailable(format!(
                "simulated insert failure for {}",
                message.recipient()
            )));
        }

        let content = message.content();
        let stored = Message {
            id: Uuid::new_v4(),
            event_id: message.event_id(),
            title: content.title.clone(),
            body: content.body.clone(),
            attachments: content.attachments.clone(),
            status: content.status,
            delivery_state: message.delivery_state(),
            unread: true,
            delivered_at: message.delivered_at(),
            attendee_id: message.attendee_id(),
            invite_id: message.invite_id(),
            // Postgres keeps microseconds; match it so cursors round-trip.
            created_at: Utc::now().trunc_subsecs(6),
        };
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        messages.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        if let Some(limit) = filter.limit {
            messages.truncate(limit.max(0) as usize);
        }
        Ok(messages)
    }

    async fn promote_queued(
        &self,
        invite_id: Uuid,
        attendee_id: Uuid,
        delivered_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let mut promoted = 0;
        for message in state.messages.iter_mut().filter(|m| {
            m.invite_id == Some(invite_id) && m.delivery_state == DeliveryState::Queued
        }) {
            message.attendee_id = Some(attendee_id);
            message.delivery_state = DeliveryState::Delivered;
            message.delivered_at = Some(delivered_at);
            promoted += 1;
        }
        Ok(promoted)
    }

    async fn mark_read(
        &self,
        event_id: Uuid,
        message_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<Option<Message>, StoreError> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let message = state.messages.iter_mut().find(|m| {
            m.id == message_id
                && m.event_id == event_id
                && m.attendee_id == Some(attendee_id)
                && m.delivery_state == DeliveryState::Delivered
        });
        Ok(message.map(|m| {
            m.unread = false;
            m.clone()
        }))
    }

    async fn count_unread(&self, event_id: Uuid, attendee_id: Uuid) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        state.check_available()?;
        let filter = MessageFilter::new(event_id, DeliveryState::Delivered)
            .for_attendee(Some(attendee_id))
            .unread_only(true);
        Ok(state.messages.iter().filter(|m| filter.matches(m)).count() as u64)
    }
}

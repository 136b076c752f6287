//! Message fan-out.
//!
//! Writes one message record per recipient. Attendee recipients get a
//! delivered record, invite recipients a queued one.
//!
//! Broadcasts are best-effort: a failed write for one recipient is logged and
//! skipped, and records already written for others are kept. Callers that need
//! all-or-nothing delivery must not rely on this service as-is.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::audience::{find_invitee, resolve_audience};
use super::store::MessageStore;
use crate::error::MessagingError;
use crate::models::{
    CreateMessageRequest, CreateMessageResponse, DeliveryState, Message, MessageContent,
    NewMessage, Recipient, RecipientTarget,
};

/// Result of a create-message call.
#[derive(Debug, Clone, Default)]
pub struct BroadcastOutcome {
    /// First record written; `None` when nothing was written.
    pub representative: Option<Message>,
    pub delivered: usize,
    pub queued: usize,
    pub failed: usize,
}

impl BroadcastOutcome {
    fn record(&mut self, message: Message) {
        match message.delivery_state {
            DeliveryState::Delivered => self.delivered += 1,
            DeliveryState::Queued => self.queued += 1,
        }
        if self.representative.is_none() {
            self.representative = Some(message);
        }
    }

    pub fn created(&self) -> usize {
        self.delivered + self.queued
    }
}

impl From<BroadcastOutcome> for CreateMessageResponse {
    fn from(outcome: BroadcastOutcome) -> Self {
        Self {
            message: outcome.representative,
            delivered: outcome.delivered,
            queued: outcome.queued,
            failed: outcome.failed,
        }
    }
}

/// Creates message records for direct, deferred and broadcast requests.
#[derive(Clone)]
pub struct BroadcastService {
    store: Arc<dyn MessageStore>,
}

impl BroadcastService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Validate a create-message request and fan it out.
    ///
    /// Requests naming both an attendee and an invite are rejected before
    /// anything is written.
    pub async fn create_broadcast(
        &self,
        event_id: Uuid,
        request: CreateMessageRequest,
    ) -> Result<BroadcastOutcome, MessagingError> {
        request.recipient_target()?;
        request.validate()?;
        let (content, target) = request.into_parts()?;
        self.dispatch(event_id, content, target).await
    }

    /// Write the records for an already-resolved, validated target.
    pub async fn dispatch(
        &self,
        event_id: Uuid,
        content: MessageContent,
        target: RecipientTarget,
    ) -> Result<BroadcastOutcome, MessagingError> {
        if !self.store.event_exists(event_id).await? {
            return Err(MessagingError::NotFound(format!(
                "Event {} not found",
                event_id
            )));
        }

        match target {
            RecipientTarget::Direct(attendee_id) => {
                let attendee = self
                    .store
                    .find_attendee(attendee_id)
                    .await?
                    .filter(|a| a.event_id == event_id)
                    .ok_or_else(|| {
                        MessagingError::NotFound(format!(
                            "Attendee {} not found for event {}",
                            attendee_id, event_id
                        ))
                    })?;
                self.create_single(event_id, content, Recipient::Attendee(attendee.id))
                    .await
            }
            RecipientTarget::Deferred(invite_id) => {
                let invite = self
                    .store
                    .find_invite(invite_id)
                    .await?
                    .filter(|i| i.event_id == event_id)
                    .ok_or_else(|| {
                        MessagingError::NotFound(format!(
                            "Invite {} not found for event {}",
                            invite_id, event_id
                        ))
                    })?;
                // Accepted and onboarded: the queued copy would never be promoted
                let attendees = self.store.list_attendees(event_id).await?;
                let recipient = match find_invitee(&invite, &attendees) {
                    Some(attendee) => Recipient::Attendee(attendee.id),
                    None => Recipient::Invite(invite.id),
                };
                self.create_single(event_id, content, recipient).await
            }
            RecipientTarget::Broadcast(selector) => {
                let audience = resolve_audience(self.store.as_ref(), event_id, selector).await?;
                let recipients: Vec<Recipient> = audience
                    .attendees
                    .iter()
                    .map(|a| Recipient::Attendee(a.id))
                    .chain(audience.invites.iter().map(|i| Recipient::Invite(i.id)))
                    .collect();

                let outcome = self.fan_out(event_id, &content, recipients).await;

                info!(
                    event_id = %event_id,
                    audience = %selector,
                    delivered = outcome.delivered,
                    queued = outcome.queued,
                    failed = outcome.failed,
                    "Broadcast fanned out"
                );

                Ok(outcome)
            }
        }
    }

    async fn create_single(
        &self,
        event_id: Uuid,
        content: MessageContent,
        recipient: Recipient,
    ) -> Result<BroadcastOutcome, MessagingError> {
        let message = self
            .store
            .insert_message(NewMessage::new(event_id, content, recipient, Utc::now()))
            .await?;

        info!(
            event_id = %event_id,
            message_id = %message.id,
            recipient = %recipient,
            delivery_state = %message.delivery_state,
            "Message created"
        );

        let mut outcome = BroadcastOutcome::default();
        outcome.record(message);
        Ok(outcome)
    }

    async fn fan_out(
        &self,
        event_id: Uuid,
        content: &MessageContent,
        recipients: Vec<Recipient>,
    ) -> BroadcastOutcome {
        let now = Utc::now();
        let mut outcome = BroadcastOutcome::default();

        for recipient in recipients {
            let message = NewMessage::new(event_id, content.clone(), recipient, now);
            match self.store.insert_message(message).await {
                Ok(message) => outcome.record(message),
                Err(e) => {
                    warn!(
                        event_id = %event_id,
                        recipient = %recipient,
                        error = %e,
                        "Failed to create broadcast message, skipping recipient"
                    );
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

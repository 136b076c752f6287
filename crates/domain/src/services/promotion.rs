//! Delivery promotion on invite acceptance.
//!
//! The acceptance workflow calls [`DeliveryPromotionService::promote_queued_messages`]
//! once the attendee record for an accepted invite exists. Every queued
//! message of the invite becomes delivered to that attendee in one
//! conditional update; repeating the call promotes nothing.

use chrono::Utc;
use shared::validation::normalize_email;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::store::MessageStore;
use crate::error::MessagingError;

/// Releases queued messages when their invite is accepted.
#[derive(Clone)]
pub struct DeliveryPromotionService {
    store: Arc<dyn MessageStore>,
}

impl DeliveryPromotionService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Promote every queued message addressed to `invite_id`.
    ///
    /// Returns the number of messages promoted. Zero is a normal outcome:
    /// the invite had nothing queued, or a previous or concurrent call
    /// already promoted it.
    pub async fn promote_queued_messages(
        &self,
        invite_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<u64, MessagingError> {
        let invite = self
            .store
            .find_invite(invite_id)
            .await?
            .ok_or_else(|| MessagingError::NotFound(format!("Invite {} not found", invite_id)))?;

        if !invite.is_accepted() {
            return Err(MessagingError::InviteNotAccepted(invite_id));
        }

        let attendee = self
            .store
            .find_attendee(attendee_id)
            .await?
            .filter(|a| a.event_id == invite.event_id)
            .ok_or_else(|| {
                MessagingError::NotFound(format!(
                    "Attendee {} not found for event {}",
                    attendee_id, invite.event_id
                ))
            })?;

        // Queued content only ever goes to the invitee
        if normalize_email(&attendee.email) != normalize_email(&invite.email) {
            return Err(MessagingError::InvalidRecipientSpecification(format!(
                "Attendee {} is not the recipient of invite {}",
                attendee_id, invite_id
            )));
        }

        let promoted = self
            .store
            .promote_queued(invite_id, attendee_id, Utc::now())
            .await?;

        if promoted == 0 {
            debug!(
                invite_id = %invite_id,
                attendee_id = %attendee_id,
                "No queued messages to promote"
            );
        } else {
            info!(
                event_id = %invite.event_id,
                invite_id = %invite_id,
                attendee_id = %attendee_id,
                promoted = promoted,
                "Promoted queued messages"
            );
        }

        Ok(promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateMessageRequest, DeliveryState, InviteStatus};
    use crate::services::fanout::BroadcastService;
    use crate::services::memory::InMemoryMessageStore;

    fn request_for_invite(invite_id: Uuid) -> CreateMessageRequest {
        CreateMessageRequest {
            title: "Welcome pack".to_string(),
            body: "Your badge is ready at the front desk.".to_string(),
            attachments: vec![],
            status: None,
            audience: None,
            attendee_id: None,
            invite_id: Some(invite_id),
        }
    }

    /// Event with one pending invite that has one queued message.
    async fn queued_fixture(store: &InMemoryMessageStore) -> (Uuid, Uuid, Uuid) {
        let event_id = store.create_event().await;
        let invite = store
            .create_invite(event_id, "i1@example.com", InviteStatus::Pending)
            .await;
        let outcome = BroadcastService::new(Arc::new(store.clone()))
            .create_broadcast(event_id, request_for_invite(invite.id))
            .await
            .unwrap();
        let message_id = outcome.representative.unwrap().id;
        (event_id, invite.id, message_id)
    }

    #[tokio::test]
    async fn test_promotion_delivers_queued_message() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, message_id) = queued_fixture(&store).await;

        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let attendee = store
            .create_attendee(event_id, "i1@example.com", Some(Utc::now()))
            .await
            .unwrap();

        let service = DeliveryPromotionService::new(Arc::new(store.clone()));
        let promoted = service
            .promote_queued_messages(invite_id, attendee.id)
            .await
            .unwrap();
        assert_eq!(promoted, 1);

        let message = store.find_message(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery_state, DeliveryState::Delivered);
        assert_eq!(message.attendee_id, Some(attendee.id));
        assert!(message.delivered_at.is_some());
        assert!(message.satisfies_delivery_invariants());
    }

    #[tokio::test]
    async fn test_second_promotion_is_noop() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, message_id) = queued_fixture(&store).await;
        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let attendee = store
            .create_attendee(event_id, "i1@example.com", None)
            .await
            .unwrap();

        let service = DeliveryPromotionService::new(Arc::new(store.clone()));
        let first = service
            .promote_queued_messages(invite_id, attendee.id)
            .await
            .unwrap();
        let before = store.find_message(message_id).await.unwrap().unwrap();

        let second = service
            .promote_queued_messages(invite_id, attendee.id)
            .await
            .unwrap();
        let after = store.find_message(message_id).await.unwrap().unwrap();

        assert_eq!((first, second), (1, 0));
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_concurrent_promotions_promote_once() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, _) = queued_fixture(&store).await;
        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let attendee = store
            .create_attendee(event_id, "i1@example.com", None)
            .await
            .unwrap();

        let service = DeliveryPromotionService::new(Arc::new(store.clone()));
        let (a, b) = tokio::join!(
            service.promote_queued_messages(invite_id, attendee.id),
            service.promote_queued_messages(invite_id, attendee.id),
        );
        assert_eq!(a.unwrap() + b.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_promotion_without_queued_messages_returns_zero() {
        let store = InMemoryMessageStore::new();
        let event_id = store.create_event().await;
        let invite = store
            .create_invite(event_id, "quiet@example.com", InviteStatus::Accepted)
            .await;
        let attendee = store
            .create_attendee(event_id, "quiet@example.com", None)
            .await
            .unwrap();

        let promoted = DeliveryPromotionService::new(Arc::new(store.clone()))
            .promote_queued_messages(invite.id, attendee.id)
            .await
            .unwrap();
        assert_eq!(promoted, 0);
    }

    #[tokio::test]
    async fn test_promotion_requires_accepted_invite() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, message_id) = queued_fixture(&store).await;
        let attendee = store
            .create_attendee(event_id, "i1@example.com", None)
            .await
            .unwrap();

        let result = DeliveryPromotionService::new(Arc::new(store.clone()))
            .promote_queued_messages(invite_id, attendee.id)
            .await;
        assert!(matches!(result, Err(MessagingError::InviteNotAccepted(id)) if id == invite_id));

        let message = store.find_message(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery_state, DeliveryState::Queued);
    }

    #[tokio::test]
    async fn test_promotion_unknown_invite_not_found() {
        let store = InMemoryMessageStore::new();
        let result = DeliveryPromotionService::new(Arc::new(store))
            .promote_queued_messages(Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(MessagingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_promotion_to_other_attendee_rejected() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, message_id) = queued_fixture(&store).await;
        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let stranger = store
            .create_attendee(event_id, "stranger@example.com", None)
            .await
            .unwrap();

        let result = DeliveryPromotionService::new(Arc::new(store.clone()))
            .promote_queued_messages(invite_id, stranger.id)
            .await;
        assert!(matches!(
            result,
            Err(MessagingError::InvalidRecipientSpecification(_))
        ));

        let message = store.find_message(message_id).await.unwrap().unwrap();
        assert_eq!(message.delivery_state, DeliveryState::Queued);
        assert_eq!(message.attendee_id, None);
    }

    #[tokio::test]
    async fn test_promotion_matches_normalized_email() {
        let store = InMemoryMessageStore::new();
        let (event_id, invite_id, _) = queued_fixture(&store).await;
        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let attendee = store
            .create_attendee(event_id, "  I1@Example.com", None)
            .await
            .unwrap();

        let promoted = DeliveryPromotionService::new(Arc::new(store.clone()))
            .promote_queued_messages(invite_id, attendee.id)
            .await
            .unwrap();
        assert_eq!(promoted, 1);
    }

    #[tokio::test]
    async fn test_promotion_attendee_from_other_event_not_found() {
        let store = InMemoryMessageStore::new();
        let (_, invite_id, _) = queued_fixture(&store).await;
        store
            .set_invite_status(invite_id, InviteStatus::Accepted)
            .await
            .unwrap();
        let other_event = store.create_event().await;
        let outsider = store
            .create_attendee(other_event, "i1@example.com", None)
            .await
            .unwrap();

        let result = DeliveryPromotionService::new(Arc::new(store.clone()))
            .promote_queued_messages(invite_id, outsider.id)
            .await;
        assert!(matches!(result, Err(MessagingError::NotFound(_))));
    }
}

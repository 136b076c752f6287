//! Invite domain model for event invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an event invite.
///
/// `Sent` and `Declined` are owned by the onboarding workflow; this service
/// only ever distinguishes accepted invites from the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    #[default]
    Pending,
    Sent,
    Accepted,
    Declined,
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteStatus::Pending => write!(f, "pending"),
            InviteStatus::Sent => write!(f, "sent"),
            InviteStatus::Accepted => write!(f, "accepted"),
            InviteStatus::Declined => write!(f, "declined"),
        }
    }
}

/// An email invited to an event, whether or not an attendee account exists yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invite {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn is_accepted(&self) -> bool {
        self.status == InviteStatus::Accepted
    }
}

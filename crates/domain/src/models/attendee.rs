//! Attendee domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person with a confirmed account for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    /// Set once the person has accepted participation.
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    /// Whether the attendee record itself carries an acceptance timestamp.
    pub fn has_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }
}

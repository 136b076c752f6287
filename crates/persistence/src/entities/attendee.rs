//! Attendee entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the attendees table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendeeEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AttendeeEntity> for domain::models::Attendee {
    fn from(entity: AttendeeEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            email: entity.email,
            accepted_at: entity.accepted_at,
            created_at: entity.created_at,
        }
    }
}

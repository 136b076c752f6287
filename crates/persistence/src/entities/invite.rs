//! Invite entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::InviteStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invite_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
pub enum InviteStatusDb {
    Pending,
    Sent,
    Accepted,
    Declined,
}

impl From<InviteStatusDb> for InviteStatus {
    fn from(db_status: InviteStatusDb) -> Self {
        match db_status {
            InviteStatusDb::Pending => InviteStatus::Pending,
            InviteStatusDb::Sent => InviteStatus::Sent,
            InviteStatusDb::Accepted => InviteStatus::Accepted,
            InviteStatusDb::Declined => InviteStatus::Declined,
        }
    }
}

impl From<InviteStatus> for InviteStatusDb {
    fn from(status: InviteStatus) -> Self {
        match status {
            InviteStatus::Pending => InviteStatusDb::Pending,
            InviteStatus::Sent => InviteStatusDb::Sent,
            InviteStatus::Accepted => InviteStatusDb::Accepted,
            InviteStatus::Declined => InviteStatusDb::Declined,
        }
    }
}

/// Database row mapping for the invites table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub status: InviteStatusDb,
    pub created_at: DateTime<Utc>,
}

impl From<InviteEntity> for domain::models::Invite {
    fn from(entity: InviteEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            email: entity.email,
            status: entity.status.into(),
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_status_conversion() {
        for status in [
            InviteStatus::Pending,
            InviteStatus::Sent,
            InviteStatus::Accepted,
            InviteStatus::Declined,
        ] {
            let db: InviteStatusDb = status.into();
            assert_eq!(InviteStatus::from(db), status);
        }
    }
}

//! Invite repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InviteEntity, InviteStatusDb};
use crate::metrics::QueryTimer;

/// Repository for invite-related database operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Creates a new InviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new invite.
    pub async fn create(
        &self,
        event_id: Uuid,
        email: &str,
        status: InviteStatusDb,
    ) -> Result<InviteEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invite");
        let result = sqlx::query_as::<_, InviteEntity>(
            r#"
            INSERT INTO invites (event_id, email, status)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, email, status, created_at
            "#,
        )
        .bind(event_id)
        .bind(email)
        .bind(status)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find invite by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_id");
        let result = sqlx::query_as::<_, InviteEntity>(
            r#"
            SELECT id, event_id, email, status, created_at
            FROM invites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every invite of an event regardless of status, oldest first.
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invites_by_event");
        let result = sqlx::query_as::<_, InviteEntity>(
            r#"
            SELECT id, event_id, email, status, created_at
            FROM invites
            WHERE event_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update an invite's status.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: InviteStatusDb,
    ) -> Result<Option<InviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_invite_status");
        let result = sqlx::query_as::<_, InviteEntity>(
            r#"
            UPDATE invites
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, email, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

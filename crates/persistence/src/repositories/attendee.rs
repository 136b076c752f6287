//! Attendee repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AttendeeEntity;
use crate::metrics::QueryTimer;

/// Repository for attendee-related database operations.
#[derive(Clone)]
pub struct AttendeeRepository {
    pool: PgPool,
}

impl AttendeeRepository {
    /// Creates a new AttendeeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an attendee. Fails with a unique violation when the email is
    /// already registered for the event.
    pub async fn create(
        &self,
        event_id: Uuid,
        email: &str,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<AttendeeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_attendee");
        let result = sqlx::query_as::<_, AttendeeEntity>(
            r#"
            INSERT INTO attendees (event_id, email, accepted_at)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, email, accepted_at, created_at
            "#,
        )
        .bind(event_id)
        .bind(email)
        .bind(accepted_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find attendee by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AttendeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_attendee_by_id");
        let result = sqlx::query_as::<_, AttendeeEntity>(
            r#"
            SELECT id, event_id, email, accepted_at, created_at
            FROM attendees
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every attendee of an event, oldest first.
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<AttendeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_attendees_by_event");
        let result = sqlx::query_as::<_, AttendeeEntity>(
            r#"
            SELECT id, event_id, email, accepted_at, created_at
            FROM attendees
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
}

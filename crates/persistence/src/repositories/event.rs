//! Event repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::QueryTimer;

/// Repository for event lookups.
///
/// Events are owned by the wider event model; messaging only needs to know
/// whether one exists.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an event and return its ID.
    pub async fn create(&self, name: &str) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO events (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check whether an event exists.
    pub async fn exists(&self, event_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("event_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

//! Message repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DeliveryStateDb, MessageEntity, MessageStatusDb};
use crate::metrics::QueryTimer;

/// Column values for a new message row.
#[derive(Debug, Clone)]
pub struct MessageInput {
    pub event_id: Uuid,
    pub title: String,
    pub body: String,
    pub attachments: Vec<String>,
    pub status: MessageStatusDb,
    pub delivery_state: DeliveryStateDb,
    pub delivered_at: Option<DateTime<Utc>>,
    pub attendee_id: Option<Uuid>,
    pub invite_id: Option<Uuid>,
}

/// Query parameters for listing messages, newest first.
#[derive(Debug, Clone)]
pub struct MessageListQuery {
    pub event_id: Uuid,
    pub delivery_state: DeliveryStateDb,
    pub attendee_id: Option<Uuid>,
    pub unread_only: bool,
    pub cursor_created_at: Option<DateTime<Utc>>,
    pub cursor_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Repository for message-related database operations.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Creates a new MessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one message record.
    pub async fn create(&self, input: MessageInput) -> Result<MessageEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_message");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (
                event_id, title, body, attachments, status,
                delivery_state, delivered_at, attendee_id, invite_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, event_id, title, body, attachments, status, delivery_state,
                      unread, delivered_at, attendee_id, invite_id, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.title)
        .bind(&input.body)
        .bind(&input.attachments)
        .bind(input.status)
        .bind(input.delivery_state)
        .bind(input.delivered_at)
        .bind(input.attendee_id)
        .bind(input.invite_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find message by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_message_by_id");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT id, event_id, title, body, attachments, status, delivery_state,
                   unread, delivered_at, attendee_id, invite_id, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List messages with optional attendee, unread and keyset filters.
    pub async fn list(&self, query: &MessageListQuery) -> Result<Vec<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_messages");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT id, event_id, title, body, attachments, status, delivery_state,
                   unread, delivered_at, attendee_id, invite_id, created_at
            FROM messages
            WHERE event_id = $1
              AND delivery_state = $2
              AND ($3::uuid IS NULL OR attendee_id = $3)
              AND (NOT $4 OR unread)
              AND ($5::timestamptz IS NULL OR (created_at, id) < ($5, $6))
            ORDER BY created_at DESC, id DESC
            LIMIT $7
            "#,
        )
        .bind(query.event_id)
        .bind(query.delivery_state)
        .bind(query.attendee_id)
        .bind(query.unread_only)
        .bind(query.cursor_created_at)
        // Max UUID keeps the keyset comparison valid when only a timestamp is given
        .bind(query.cursor_id.unwrap_or_else(|| Uuid::from_bytes([0xff; 16])))
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Promote every queued message of an invite to delivered.
    ///
    /// A single conditional UPDATE: rows already delivered are not touched,
    /// so concurrent or repeated calls promote each message at most once.
    pub async fn promote_queued(
        &self,
        invite_id: Uuid,
        attendee_id: Uuid,
        delivered_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("promote_queued_messages");
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET attendee_id = $2,
                delivery_state = 'delivered',
                delivered_at = $3
            WHERE invite_id = $1
              AND delivery_state = 'queued'
            "#,
        )
        .bind(invite_id)
        .bind(attendee_id)
        .bind(delivered_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Clear the unread flag of a delivered message owned by the attendee.
    pub async fn mark_read(
        &self,
        event_id: Uuid,
        message_id: Uuid,
        attendee_id: Uuid,
    ) -> Result<Option<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_message_read");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages
            SET unread = false
            WHERE id = $1
              AND event_id = $2
              AND attendee_id = $3
              AND delivery_state = 'delivered'
            RETURNING id, event_id, title, body, attachments, status, delivery_state,
                      unread, delivered_at, attendee_id, invite_id, created_at
            "#,
        )
        .bind(message_id)
        .bind(event_id)
        .bind(attendee_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count delivered, unread messages for an attendee.
    pub async fn count_unread(&self, event_id: Uuid, attendee_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_messages");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE event_id = $1
              AND attendee_id = $2
              AND delivery_state = 'delivered'
              AND unread
            "#,
        )
        .bind(event_id)
        .bind(attendee_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

//! Message Repository Implementation
//!
//! PostgreSQL implementation of message persistence and chat history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Instant;

use crate::domain::{Message, MessageRepository, UserId};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    text: String,
    sender_id: i64,
    receiver_id: i64,
    timestamp: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            text: self.text,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            timestamp: self.timestamp,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
    ) -> Result<Message, AppError> {
        let start = Instant::now();
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (text, sender_id, receiver_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, sender_id, receiver_id, "timestamp"
            "#,
        )
        .bind(text)
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;
        metrics::record_db_query("insert", "messages", start.elapsed().as_secs_f64());

        Ok(row.into_message())
    }

    /// Both directions of the conversation, oldest first. Ties on timestamp
    /// fall back to insertion order.
    async fn find_conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Vec<Message>, AppError> {
        let start = Instant::now();
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, text, sender_id, receiver_id, "timestamp"
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY "timestamp" ASC, id ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await?;
        metrics::record_db_query("select", "messages", start.elapsed().as_secs_f64());

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }
}

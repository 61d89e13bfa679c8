//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;
use crate::shared::error::AppError;

/// A direct message between two users.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - text: TEXT NOT NULL
/// - sender_id: BIGINT NOT NULL REFERENCES users(id)
/// - receiver_id: BIGINT NOT NULL REFERENCES users(id)
/// - timestamp: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Messages are immutable once created. Serialized in camelCase because this
/// is the shape clients receive in `message_received` and in chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,

    pub text: String,

    pub sender_id: UserId,

    pub receiver_id: UserId,

    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Whether the message was sent to its own author.
    pub fn is_self_chat(&self) -> bool {
        self.sender_id == self.receiver_id
    }
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message. The store assigns `id` and `timestamp`.
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
    ) -> Result<Message, AppError>;

    /// Every message exchanged between the two users in either direction,
    /// ascending by timestamp.
    async fn find_conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Vec<Message>, AppError>;
}

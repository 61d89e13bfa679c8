//! Message Service
//!
//! Chat history between two users. Sending goes through the WebSocket
//! dispatcher, not this service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Message, MessageRepository, UserId};
use crate::shared::error::AppError;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Every message between `user_id` and `other_user_id`, oldest first
    async fn chat_history(&self, user_id: UserId, other_user_id: UserId) -> Result<Vec<Message>, AppError>;
}

/// MessageService implementation
pub struct MessageServiceImpl<M>
where
    M: MessageRepository,
{
    message_repo: Arc<M>,
}

impl<M> MessageServiceImpl<M>
where
    M: MessageRepository,
{
    pub fn new(message_repo: Arc<M>) -> Self {
        Self { message_repo }
    }
}

#[async_trait]
impl<M> MessageService for MessageServiceImpl<M>
where
    M: MessageRepository + 'static,
{
    async fn chat_history(&self, user_id: UserId, other_user_id: UserId) -> Result<Vec<Message>, AppError> {
        self.message_repo.find_conversation(user_id, other_user_id).await
    }
}

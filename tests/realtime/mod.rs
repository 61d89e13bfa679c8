//! Realtime Tests
//!
//! Drive the gateway the way the socket handler does, with outboxes read
//! directly instead of over a socket.

mod dispatch_tests;
mod presence_tests;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use chat_hub::domain::{Message, MessageRepository, UserId};
use chat_hub::presentation::websocket::{
    ConnectionHandle, ConnectionLifecycle, Gateway, ServerEvent,
};
use chat_hub::shared::error::AppError;

/// Message store kept in memory, in insertion order
#[derive(Default)]
pub struct InMemoryMessages {
    messages: Mutex<Vec<Message>>,
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
    ) -> Result<Message, AppError> {
        let mut messages = self.messages.lock();
        let message = Message {
            id: messages.len() as i64 + 1,
            text: text.to_string(),
            sender_id,
            receiver_id,
            timestamp: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Vec<Message>, AppError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .cloned()
            .collect())
    }
}

/// One simulated client connection
pub struct Client {
    pub lifecycle: ConnectionLifecycle,
    pub outbox: UnboundedReceiver<ServerEvent>,
}

impl Client {
    pub fn connect(gateway: &Arc<Gateway>) -> Self {
        let (handle, outbox) = ConnectionHandle::channel();
        Self {
            lifecycle: ConnectionLifecycle::open(gateway.clone(), handle),
            outbox,
        }
    }

    /// Everything queued for this client so far
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.outbox.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn presence(&mut self) -> Vec<Vec<UserId>> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::OnlineUsersUpdated(users) => Some(users),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&mut self) -> Vec<Message> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::MessageReceived(m) => Some(m),
                _ => None,
            })
            .collect()
    }
}

//! Message Dispatcher
//!
//! Persists an outgoing direct message and pushes it to every live
//! connection of the receiver and the sender.
//!
//! Delivery is at most once per connection and only to connections that are
//! bound when the message is fanned out. A receiver with no connections gets
//! nothing live; the message is still stored and shows up in chat history.
//! Nothing is ever sent back to the sender on failure, and nothing is retried.

use std::sync::Arc;

use super::gateway::Gateway;
use super::messages::{coerce_user_id, SendMessagePayload, ServerEvent};
use crate::domain::{Message, MessageRepository, UserId};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub message: Message,
    /// Connections the `message_received` event was queued for
    pub recipients: usize,
}

/// Why a send was dropped.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Sender is not bound to a user")]
    UnboundSender,

    #[error("Message content is missing")]
    MissingContent,

    #[error("Receiver id is missing")]
    MissingReceiver,

    #[error("Invalid receiver id: {0}")]
    InvalidReceiver(String),

    #[error("Failed to persist message: {0}")]
    Persistence(#[source] AppError),
}

impl DispatchError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchError::UnboundSender => "unbound_sender",
            DispatchError::MissingContent => "missing_content",
            DispatchError::MissingReceiver => "missing_receiver",
            DispatchError::InvalidReceiver(_) => "invalid_receiver",
            DispatchError::Persistence(_) => "persistence",
        }
    }
}

pub struct MessageDispatcher<M>
where
    M: MessageRepository,
{
    message_repo: Arc<M>,
    gateway: Arc<Gateway>,
}

impl<M> MessageDispatcher<M>
where
    M: MessageRepository,
{
    pub fn new(message_repo: Arc<M>, gateway: Arc<Gateway>) -> Self {
        Self {
            message_repo,
            gateway,
        }
    }

    /// Handle a `send_message` event from a connection bound to `sender`.
    ///
    /// Errors are logged here; callers only need the result for inspection.
    pub async fn handle_outgoing_message(
        &self,
        sender: Option<UserId>,
        payload: SendMessagePayload,
    ) -> Result<Delivery, DispatchError> {
        let result = self.dispatch(sender, payload).await;

        match &result {
            Ok(delivery) => {
                metrics::record_dispatch(delivery.recipients);
                tracing::info!(
                    message_id = delivery.message.id,
                    sender_id = delivery.message.sender_id,
                    receiver_id = delivery.message.receiver_id,
                    recipients = delivery.recipients,
                    "Message dispatched"
                );
            }
            Err(DispatchError::Persistence(e)) => {
                metrics::record_dropped_message("persistence");
                tracing::error!(sender_id = ?sender, error = %e, "Failed to save message");
            }
            Err(e) => {
                metrics::record_dropped_message(e.reason());
                tracing::warn!(sender_id = ?sender, error = %e, "Dropped outgoing message");
            }
        }

        result
    }

    async fn dispatch(
        &self,
        sender: Option<UserId>,
        payload: SendMessagePayload,
    ) -> Result<Delivery, DispatchError> {
        let sender_id = sender.ok_or(DispatchError::UnboundSender)?;

        let raw_receiver = payload
            .receiver_id
            .filter(|v| !v.is_null())
            .ok_or(DispatchError::MissingReceiver)?;
        let receiver_id = coerce_user_id(&raw_receiver)
            .ok_or_else(|| DispatchError::InvalidReceiver(raw_receiver.to_string()))?;

        let text = payload
            .message_content
            .ok_or(DispatchError::MissingContent)?;

        // No registry lock is held across this await
        let message = self
            .message_repo
            .create(sender_id, receiver_id, &text)
            .await
            .map_err(DispatchError::Persistence)?;

        let recipients = self.fan_out(&message);

        Ok(Delivery {
            message,
            recipients,
        })
    }

    fn fan_out(&self, message: &Message) -> usize {
        let event = ServerEvent::MessageReceived(message.clone());

        let mut recipients = self.gateway.send_to_user(message.receiver_id, &event);
        if !message.is_self_chat() {
            recipients += self.gateway.send_to_user(message.sender_id, &event);
        }
        recipients
    }
}

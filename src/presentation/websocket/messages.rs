//! WebSocket Message Types
//!
//! Every frame is a JSON object `{"t": <event name>, "d": <payload>}`.
//! Client events are parsed into [`ClientEvent`] at the socket boundary;
//! the core only ever sees typed payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Message, UserId};

/// Events a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this connection to a user identity
    Hello(HelloPayload),
    /// Send a direct message
    SendMessage(SendMessagePayload),
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t", content = "d", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full snapshot of online user ids, replaces any previous one
    OnlineUsersUpdated(Vec<UserId>),
    /// A message the connection's user sent or received
    MessageReceived(Message),
}

impl ServerEvent {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::OnlineUsersUpdated(_) => "online_users_updated",
            ServerEvent::MessageReceived(_) => "message_received",
        }
    }
}

/// `hello` payload.
///
/// `userId` is kept as raw JSON and coerced with [`coerce_user_id`], so both
/// `7` and `"7"` are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    #[serde(default)]
    pub user_id: Value,

    /// Access token, checked only when hello verification is enabled
    #[serde(default)]
    pub token: Option<String>,
}

/// `send_message` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub message_content: Option<String>,

    #[serde(default)]
    pub receiver_id: Option<Value>,
}

/// Coerce a JSON value into a user id.
///
/// Accepts positive integers, integral floats and strings holding a positive
/// integer (surrounding whitespace ignored). Everything else, including zero
/// and negative ids, yields `None`.
pub fn coerce_user_id(value: &Value) -> Option<UserId> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        })?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (id > 0).then_some(id)
}

//! WebSocket Connection Handler
//!
//! Upgrades the HTTP request, then runs one task per connection: a writer
//! task drains the connection's outbox into the socket while the reader loop
//! handles one client event at a time.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use super::lifecycle::ConnectionLifecycle;
use super::messages::{coerce_user_id, ClientEvent, HelloPayload};
use super::registry::ConnectionHandle;
use crate::application::services::auth_service::decode_access_token;
use crate::domain::UserId;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (handle, mut outbox) = ConnectionHandle::channel();
    let connection_id = handle.id();
    let (mut sender, mut receiver) = socket.split();

    let sender_task = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(event = event.event_name(), "Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut lifecycle = ConnectionLifecycle::open(state.gateway.clone(), handle);

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_frame(text.as_str(), &mut lifecycle, &state).await,
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection_id, "Close frame received");
                break;
            }
            // Ping/pong handled by axum; binary frames are not part of the protocol
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    lifecycle.disconnect();
    sender_task.abort();
}

/// Handle one text frame. Bad frames are logged and ignored.
async fn handle_frame(text: &str, lifecycle: &mut ConnectionLifecycle, state: &AppState) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                connection_id = %lifecycle.connection_id(),
                error = %e,
                "Ignoring unparseable frame"
            );
            return;
        }
    };

    match event {
        ClientEvent::Hello(hello) => {
            let Some(user_id) = coerce_user_id(&hello.user_id) else {
                tracing::debug!(
                    connection_id = %lifecycle.connection_id(),
                    user_id = %hello.user_id,
                    "Ignoring hello with invalid user id"
                );
                return;
            };

            if state.settings.websocket.require_hello_token
                && !hello_token_matches(&hello, user_id, state)
            {
                tracing::warn!(
                    connection_id = %lifecycle.connection_id(),
                    user_id,
                    "Ignoring hello without a matching access token"
                );
                return;
            }

            lifecycle.hello(user_id);
        }
        ClientEvent::SendMessage(payload) => {
            // Failures are logged by the dispatcher and never reported back
            let _ = state
                .dispatcher
                .handle_outgoing_message(lifecycle.user_id(), payload)
                .await;
        }
    }
}

fn hello_token_matches(hello: &HelloPayload, user_id: UserId, state: &AppState) -> bool {
    hello
        .token
        .as_deref()
        .and_then(|token| decode_access_token(token, &state.settings.jwt.secret).ok())
        .and_then(|claims| claims.sub.parse::<UserId>().ok())
        .is_some_and(|subject| subject == user_id)
}

//! Message Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::application::dto::response::ChatHistoryResponse;
use crate::application::services::{MessageService, MessageServiceImpl};
use crate::domain::UserId;
use crate::infrastructure::repositories::PgMessageRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Get chat history with another user
pub async fn get_chat_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    let other_user_id: UserId = other_user_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID parameter".into()))?;

    let message_service =
        MessageServiceImpl::new(Arc::new(PgMessageRepository::new(state.db.clone())));

    let messages = message_service
        .chat_history(auth.user_id, other_user_id)
        .await?;

    Ok(Json(ChatHistoryResponse { messages }))
}

//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::application::dto::response::UserSummary;
use crate::application::services::{UserService, UserServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List every user except the caller
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let user_service = UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())));

    let users = user_service.list_contacts(auth.user_id).await?;

    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

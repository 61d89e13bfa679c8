//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{LoginResponse, RegisterResponse};
use crate::application::services::{AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    AuthServiceImpl::new(user_repo, state.settings.jwt.clone())
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(AppError::from_validation)?;

    let user = auth_service(&state)
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully",
            user_id: user.id,
        }),
    ))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    body.validate().map_err(AppError::from_validation)?;

    let (user, token) = auth_service(&state)
        .authenticate(&body.email, &body.password)
        .await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: token.access_token,
        user_id: user.id,
        name: user.name,
    }))
}

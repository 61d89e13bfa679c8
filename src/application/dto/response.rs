//! Response DTOs
//!
//! Data structures for API response bodies. Field names are camelCase to
//! match what clients already consume.

use serde::Serialize;

use crate::domain::{Message, User, UserId};

/// Registration response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user_id: UserId,
    pub name: String,
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Chat history response
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<Message>,
}

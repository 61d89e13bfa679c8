//! User Service
//!
//! Contact listing for the authenticated user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{User, UserId, UserRepository};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Every registered user other than `user_id`
    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<User>, AppError>;
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<User>, AppError> {
        self.user_repo.find_all_except(user_id).await
    }
}

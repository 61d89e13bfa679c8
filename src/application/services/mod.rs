//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, access tokens
//! - **UserService**: Contact listing
//! - **MessageService**: Chat history

pub mod auth_service;
pub mod message_service;
pub mod user_service;

pub use auth_service::{AuthError, AuthService, AuthServiceImpl, AuthToken, Claims};
pub use message_service::{MessageService, MessageServiceImpl};
pub use user_service::{UserService, UserServiceImpl};

//! # Domain Entities
//!
//! - **User**: account with credentials, the identity behind a connection
//! - **Message**: a direct message between two users
//!
//! Each entity has an associated repository trait. The traits are implemented
//! in the infrastructure layer.

mod message;
mod user;

pub use message::{Message, MessageRepository};
#[cfg(test)]
pub use message::MockMessageRepository;
pub use user::{User, UserId, UserRepository};
#[cfg(test)]
pub use user::MockUserRepository;

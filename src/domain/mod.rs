//! # Domain Layer
//!
//! The domain layer contains the core business types of the chat hub.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities are plain data; persistence assigns identifiers

pub mod entities;

pub use entities::*;

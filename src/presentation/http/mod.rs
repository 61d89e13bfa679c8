//! HTTP API
//!
//! REST endpoints for authentication, users and chat history.

pub mod handlers;
pub mod routes;

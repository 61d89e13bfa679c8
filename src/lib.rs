//! # Chat Hub Library
//!
//! A direct-message chat backend with:
//! - REST endpoints for registration, login, contacts and chat history
//! - A WebSocket channel for live presence and message delivery
//! - PostgreSQL for users and messages
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities and repository traits
//! - **Application Layer**: Auth, user and history services plus DTOs
//! - **Infrastructure Layer**: Database, repositories and metrics
//! - **Presentation Layer**: HTTP handlers and the realtime gateway
//!
//! ## Module Structure
//!
//! ```text
//! chat_hub/
//! +-- config/         Configuration management
//! +-- domain/         Entities and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, repositories, metrics
//! +-- presentation/   HTTP routes, middleware, WebSocket gateway
//! +-- shared/         Common error type
//! ```
//!
//! Presence lives in memory only. After a restart every user is offline
//! until their clients say hello again.

pub mod config;

pub mod domain;

pub mod application;

pub mod infrastructure;

pub mod presentation;

pub mod shared;

pub mod startup;

pub mod telemetry;

//! Infrastructure Layer
//!
//! Contains implementations for external services:
//! - Database pool and repositories (PostgreSQL)
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;

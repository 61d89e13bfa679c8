//! # Chat Hub
//!
//! Direct-message chat backend with live presence.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use chat_hub::config::Settings;
use chat_hub::presentation::http::handlers::health;
use chat_hub::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    chat_hub::telemetry::init_tracing();
    health::init_server_start();

    info!("Starting Chat Hub...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        require_hello_token = settings.websocket.require_hello_token,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::PgMessageRepository;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{Gateway, MessageDispatcher};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gateway: Arc<Gateway>,
    pub dispatcher: Arc<MessageDispatcher<PgMessageRepository>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire a fresh gateway and dispatcher around `db`.
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let gateway = Arc::new(Gateway::new());
        let message_repo = Arc::new(PgMessageRepository::new(db.clone()));
        let dispatcher = Arc::new(MessageDispatcher::new(message_repo, gateway.clone()));

        Self {
            db,
            gateway,
            dispatcher,
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with the global layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        let addr = settings.server_addr();
        let router = build_router(AppState::new(db, settings));

        let listener = TcpListener::bind(addr.as_str()).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

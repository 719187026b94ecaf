//! HTTP server for the PDF question-answering service

pub mod routes;
pub mod state;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::session::SessionManager;
use state::AppState;

/// PDF Q&A HTTP server
pub struct PdfQaServer {
    state: AppState,
}

impl PdfQaServer {
    pub fn new(config: AppConfig, manager: SessionManager) -> Self {
        Self {
            state: AppState::new(config, manager),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let config = self.state.config();

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .nest("/api", routes::api_routes(config.server.max_upload_size))
            .with_state(self.state.clone())
            // Applied bottom to top
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server and the idle-session sweeper
    pub async fn start(self) -> Result<()> {
        let config = self.state.config();
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        let sweeper = spawn_session_sweeper(self.state.clone());
        self.state.set_ready(true);
        tracing::info!("Listening on http://{}", addr);

        let served = axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)));

        self.state.set_ready(false);
        sweeper.abort();
        served
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let server = &self.state.config().server;
        format!("{}:{}", server.host, server.port)
    }
}

/// End sessions that have been idle past the configured timeout
fn spawn_session_sweeper(state: AppState) -> JoinHandle<()> {
    let max_idle = state.config().session.idle_timeout();
    let mut interval = tokio::time::interval(state.config().session.sweep_interval());

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            let evicted = state.sessions().evict_idle(max_idle);
            if evicted > 0 {
                tracing::info!(
                    "Evicted {} idle sessions ({} remaining)",
                    evicted,
                    state.sessions().len()
                );
            }
        }
    })
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

//! Local CRM backend for development and end-to-end runs.
//!
//! Serves the opportunity routes the HTTP gateway talks to, backed by an
//! in-memory store seeded with the demo records (UUID ids).

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::board::demo::persisted_seed;
use crate::gateway::InMemoryGateway;
use crate::session::SessionTokens;
use api::{AppState, SharedState};

/// Configuration for the local backend.
pub struct ServerConfig {
    pub port: u16,
    pub dev_mode: bool,
    /// Require bearer auth with this initial token pair.
    pub auth: Option<SessionTokens>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            dev_mode: false,
            auth: None,
        }
    }
}

pub fn build_router(state: SharedState, dev_mode: bool) -> Router {
    let app = api::api_router().with_state(state);
    if dev_mode {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Seeded state for a fresh server.
pub fn seeded_state(auth: Option<SessionTokens>) -> SharedState {
    let store = Arc::new(InMemoryGateway::new(persisted_seed(Utc::now())));
    Arc::new(match auth {
        Some(tokens) => AppState::with_auth(store, tokens),
        None => AppState::new(store),
    })
}

/// Bind the listener. Port 0 picks an ephemeral port.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let host = if config.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, config.port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))
}

/// Serve until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Start the local backend and block until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr> {
    let state = seeded_state(config.auth.clone());
    let app = build_router(state, config.dev_mode);
    let listener = bind(&config).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(%local_addr, dev_mode = config.dev_mode, "local backend listening");
    println!("Pipeline backend running at http://{}/api/v1", local_addr);

    serve_with_shutdown(listener, app, shutdown_signal()).await?;

    println!("Server shut down gracefully.");
    Ok(local_addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        futures::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}

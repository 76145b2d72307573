//! HTTP server wiring: routes, shared state, and the serve loop.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::activity::Activity;
use crate::adapter::ChannelAdapter;
use crate::dialog::ProductDialog;
use crate::state::UserState;

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    /// Channel adapter for turn processing and reply delivery.
    pub adapter: Arc<ChannelAdapter>,
    /// The conversation handler.
    pub dialog: Arc<ProductDialog>,
    /// User state store; built alongside conversation state, not yet
    /// consumed by any turn path.
    pub user_state: UserState,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Listener configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: shopmate_core::config::DEFAULT_PORT }
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(messages))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Channel webhook: hand the activity to the adapter and dialog.
///
/// Always answers 200 once the turn completes; turn failures have already
/// been converted into safe replies by the adapter.
async fn messages(State(state): State<AppState>, Json(activity): Json<Activity>) -> StatusCode {
    state.adapter.process(activity, state.dialog.as_ref()).await;
    StatusCode::OK
}

/// Liveness check.
async fn ping() -> &'static str {
    "pong 🏓"
}

/// Bind and serve until the process is stopped.
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "listening for channel messages on /api/messages");
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}

//! Dashboard and JSON API.

mod state;

pub use state::{OracleState, SharedState, Status, shared};

#[cfg(test)]
pub(crate) use state::fixtures;

use crate::history::HistoryEntry;
use anyhow::Result;
use axum::{Json, Router, extract::State, response::Html, routing::get};
use serde::Serialize;
use std::future::Future;
use tower_http::trace::TraceLayer;
use tracing::info;

const DASHBOARD: &str = include_str!("../../static/index.html");

#[derive(Serialize)]
struct Health {
    status: &'static str,
    uptime: f64,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: SharedState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, "Dashboard listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD)
}

async fn status(State(state): State<SharedState>) -> Json<Status> {
    Json(state.read().await.status().clone())
}

async fn history(State(state): State<SharedState>) -> Json<Vec<HistoryEntry>> {
    Json(state.read().await.history().to_vec())
}

async fn health(State(state): State<SharedState>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        uptime: state.read().await.uptime_secs(),
    })
}

//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use shuffler_engine::domain::engine::SelectionEngine;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status: `ok`, or `degraded` if the engine cannot be read.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Outstanding engine timers, when the engine is readable.
    pub pending_timers: Option<usize>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pending_timers = state.engine.read(SelectionEngine::pending_timers).ok();
    Json(HealthResponse {
        status: if pending_timers.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        pending_timers,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

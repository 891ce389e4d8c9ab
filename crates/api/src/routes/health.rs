use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Current assignment snapshot revision.
    pub assignments_revision: u64,
    /// Number of prospects still awaiting a manager.
    pub pending_prospects: usize,
}

/// GET /health -- returns service status and store revisions.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        assignments_revision: state.portfolio.assignments.snapshot().revision,
        pending_prospects: state.portfolio.prospects.snapshot().items.len(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

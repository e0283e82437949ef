//! System routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub generator_configured: bool,
}

/// Build the system router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/v1/sys/health", get(health))
}

/// `GET /v1/sys/health`: liveness only; storage is not probed.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        generator_configured: state.generator.is_some(),
    })
}

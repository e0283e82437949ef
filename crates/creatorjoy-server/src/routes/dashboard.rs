//! Dashboard summary route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use creatorjoy_core::dashboard::{self, DashboardSnapshot};

use crate::error::AppError;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/v1/dashboard", get(snapshot))
}

/// `GET /v1/dashboard`: styles, header statistics and whether generation
/// can be offered.
async fn snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let snapshot = dashboard::load_snapshot(&state.styles, &state.history, Utc::now()).await?;
    Ok(Json(snapshot))
}

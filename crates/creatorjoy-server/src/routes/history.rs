//! Boost history routes.
//!
//! History is written by the generation workflow through `POST /v1/history`;
//! the dashboard only reads it. Entries carry the current name of their
//! style, or `null` once that style has been deleted.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use creatorjoy_core::history::DEFAULT_RECENT_LIMIT;
use creatorjoy_core::models::{BoostHistory, HistoryEntry, NewBoostRecord};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for history listing.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Return at most this many entries (default 10).
    pub limit: Option<usize>,
    /// Return every entry; `limit` is ignored.
    #[serde(default)]
    pub all: bool,
}

/// Response for history listing.
#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    pub entries: Vec<HistoryEntry>,
}

/// Build the history router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/history", get(list_history).post(record_boost))
        .route("/v1/history/last", get(last_boost))
        .route("/v1/history/{id}", delete(delete_entry))
}

/// `GET /v1/history?limit=N` or `GET /v1/history?all=true`
async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryListResponse>, AppError> {
    let entries = if query.all {
        state.history.list_with_style_names(&state.styles).await?
    } else {
        let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        state
            .history
            .recent_with_style_names(&state.styles, limit)
            .await?
    };
    Ok(Json(HistoryListResponse { entries }))
}

/// `GET /v1/history/last`: `null` when nothing has been generated yet.
async fn last_boost(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<BoostHistory>>, AppError> {
    Ok(Json(state.history.last_boost().await?))
}

/// `POST /v1/history`: workflow ingestion.
async fn record_boost(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewBoostRecord>,
) -> Result<(StatusCode, Json<BoostHistory>), AppError> {
    let record = state.history.record(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /v1/history/{id}`
async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.history.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

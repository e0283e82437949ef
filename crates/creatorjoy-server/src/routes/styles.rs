//! Style profile routes.
//!
//! CRUD over style profiles plus the count used to decide whether boost
//! generation can be offered at all.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use creatorjoy_core::models::{NewStyle, StylePatch, StyleProfile};

use crate::error::AppError;
use crate::state::AppState;

/// Response for style listing.
#[derive(Debug, Serialize)]
pub struct StyleListResponse {
    pub styles: Vec<StyleProfile>,
}

/// Response for the style count.
#[derive(Debug, Serialize)]
pub struct StyleCountResponse {
    pub count: usize,
    pub has_usable_profile: bool,
}

/// Build the styles router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/styles", get(list_styles).post(create_style))
        .route("/v1/styles/count", get(count_styles))
        .route(
            "/v1/styles/{id}",
            get(get_style).patch(update_style).delete(delete_style),
        )
}

/// `GET /v1/styles`: newest first.
async fn list_styles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StyleListResponse>, AppError> {
    let styles = state.styles.list().await?;
    Ok(Json(StyleListResponse { styles }))
}

/// `POST /v1/styles`
async fn create_style(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewStyle>,
) -> Result<(StatusCode, Json<StyleProfile>), AppError> {
    let profile = state.styles.create(body).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /v1/styles/count`
async fn count_styles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StyleCountResponse>, AppError> {
    let count = state.styles.count().await?;
    Ok(Json(StyleCountResponse {
        count,
        has_usable_profile: count > 0,
    }))
}

/// `GET /v1/styles/{id}`
async fn get_style(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StyleProfile>, AppError> {
    Ok(Json(state.styles.get(&id).await?))
}

/// `PATCH /v1/styles/{id}`: merge the present fields.
async fn update_style(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<StylePatch>,
) -> Result<Json<StyleProfile>, AppError> {
    Ok(Json(state.styles.update(&id, patch).await?))
}

/// `DELETE /v1/styles/{id}`: idempotent.
async fn delete_style(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.styles.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

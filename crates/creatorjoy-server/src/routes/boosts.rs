//! Boost generation route.
//!
//! Looks up the selected style and makes one bounded call to the generation
//! webhook. A 504 does not mean the boost is lost: the workflow may still
//! write it to history.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use creatorjoy_core::models::Boost;

use crate::error::AppError;
use crate::state::AppState;

/// Request body for generating a boost.
#[derive(Debug, Deserialize)]
pub struct GenerateBoostRequest {
    pub style_id: String,
    #[serde(default)]
    pub user_idea: String,
    /// Override the configured deadline for this call.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Build the boosts router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/v1/boosts", post(generate_boost))
}

/// `POST /v1/boosts`
async fn generate_boost(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBoostRequest>,
) -> Result<Json<Boost>, AppError> {
    let Some(generator) = state.generator.as_ref() else {
        return Err(AppError::Unavailable(
            "boost generation is not configured (set CREATORJOY_WEBHOOK_URL)".to_owned(),
        ));
    };
    if body.style_id.trim().is_empty() {
        return Err(AppError::BadRequest("style_id is required".to_owned()));
    }

    let style = state.styles.get(&body.style_id).await?;
    let timeout = body
        .timeout_ms
        .filter(|ms| *ms > 0)
        .map_or(generator.default_timeout(), Duration::from_millis);

    info!(style_id = %style.id, timeout_ms = timeout.as_millis(), "generating boost");
    let boost = generator
        .generate_with_timeout(&style, &body.user_idea, timeout)
        .await?;
    Ok(Json(boost))
}

//! HTTP route handlers, one module per resource.

pub mod boosts;
pub mod dashboard;
pub mod history;
pub mod styles;
pub mod sys;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
///
/// `cors_origin` restricts cross-origin access to one origin; any origin is
/// allowed when it is `None` or not a valid header value.
pub fn build_router(state: Arc<AppState>, cors_origin: Option<&str>) -> Router {
    let origin = match cors_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!(error = %e, "invalid CREATORJOY_CORS_ORIGIN; allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    // Generation holds a webhook connection for up to the timeout.
    let boost_routes = boosts::router().layer(tower::limit::ConcurrencyLimitLayer::new(32));

    Router::new()
        .merge(styles::router())
        .merge(history::router())
        .merge(dashboard::router())
        .merge(boost_routes)
        .merge(sys::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

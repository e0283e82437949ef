//! HTTP error types for the CreatorJoy server.
//!
//! Maps domain errors from `creatorjoy-core` into HTTP responses. Every
//! error variant produces a JSON body with a machine-readable `error` field
//! and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use creatorjoy_core::error::{BoostError, DashboardError, HistoryError, StyleError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Requested resource not found.
    NotFound(String),
    /// Client sent invalid input.
    BadRequest(String),
    /// The generation webhook failed or answered with an error.
    BadGateway(String),
    /// The generation webhook did not answer in time.
    GatewayTimeout(String),
    /// Boost generation is not configured on this server.
    Unavailable(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            Self::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", msg),
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            Self::Internal(msg) => {
                error!(message = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StyleError> for AppError {
    fn from(err: StyleError) -> Self {
        match err {
            StyleError::NotFound { .. } => Self::NotFound(err.to_string()),
            StyleError::Validation { .. } => Self::BadRequest(err.to_string()),
            StyleError::Internal { .. } | StyleError::Storage(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Validation { .. } => Self::BadRequest(err.to_string()),
            HistoryError::Internal { .. } | HistoryError::Storage(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<BoostError> for AppError {
    fn from(err: BoostError) -> Self {
        match err {
            BoostError::Validation { .. } => Self::BadRequest(err.to_string()),
            BoostError::Config { .. } => Self::Unavailable(err.to_string()),
            BoostError::Timeout { .. } => Self::GatewayTimeout(err.to_string()),
            BoostError::Remote { .. } | BoostError::Transport(_) => {
                Self::BadGateway(err.to_string())
            }
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Style(e) => e.into(),
            DashboardError::History(e) => e.into(),
        }
    }
}

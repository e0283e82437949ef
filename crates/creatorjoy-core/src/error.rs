//! Error types for `creatorjoy-core`.
//!
//! Each domain gets its own enum. Remote failures keep the distinction
//! between "the webhook said no", "the request never completed" and "we gave
//! up waiting", because the dashboard words those differently.

use creatorjoy_storage::StorageError;

/// Errors from style profile operations.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// The profile failed local checks before anything was written.
    #[error("invalid style profile: {reason}")]
    Validation { reason: String },

    /// No profile exists with the given id.
    #[error("style profile '{id}' not found")]
    NotFound { id: String },

    /// A stored document could not be encoded or decoded.
    #[error("style store internal error: {reason}")]
    Internal { reason: String },

    /// The storage backend failed.
    #[error("style store storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from boost history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The ingested record failed local checks.
    #[error("invalid boost record: {reason}")]
    Validation { reason: String },

    /// A stored document could not be encoded or decoded.
    #[error("history internal error: {reason}")]
    Internal { reason: String },

    /// The storage backend failed.
    #[error("history storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from boost generation.
#[derive(Debug, thiserror::Error)]
pub enum BoostError {
    /// The generator was given input it cannot send.
    #[error("invalid boost request: {reason}")]
    Validation { reason: String },

    /// The generator is missing required configuration.
    #[error("boost generator config error: {reason}")]
    Config { reason: String },

    /// The deadline passed before the webhook answered. The remote workflow
    /// may still finish and write history.
    #[error(
        "the webhook is taking too long to respond (no reply within {timeout_ms} ms); \
         the boost may still be saved to history automatically"
    )]
    Timeout { timeout_ms: u128 },

    /// The webhook answered with a non-success status.
    #[error("webhook error: {status} {status_text}")]
    Remote { status: u16, status_text: String },

    /// The request could not be sent or its body could not be read.
    #[error("webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl BoostError {
    /// Whether the call was abandoned at the deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Short label for structured logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Config { .. } => "config",
            Self::Timeout { .. } => "timeout",
            Self::Remote { .. } => "remote",
            Self::Transport(_) => "transport",
        }
    }
}

/// Errors from loading the dashboard snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Loading styles failed.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// Loading history statistics failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_warns_about_remote_side_effects() {
        let err = BoostError::Timeout { timeout_ms: 60_000 };
        let msg = err.to_string();
        assert!(msg.contains("60000 ms"));
        assert!(msg.contains("may still be saved to history"));
        assert!(err.is_timeout());
    }

    #[test]
    fn remote_error_carries_status() {
        let err = BoostError::Remote {
            status: 502,
            status_text: "Bad Gateway".to_owned(),
        };
        assert_eq!(err.to_string(), "webhook error: 502 Bad Gateway");
        assert!(!err.is_timeout());
        assert_eq!(err.category(), "remote");
    }

    #[test]
    fn not_found_names_the_id() {
        let err = StyleError::NotFound {
            id: "abc".to_owned(),
        };
        assert_eq!(err.to_string(), "style profile 'abc' not found");
    }
}

//! Storage error types.

/// Errors that can occur during storage operations.
///
/// Every variant names the key or prefix involved so a failed dashboard
/// request can be traced back to the record that caused it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to connect to or migrate the storage backend.
    #[error("failed to open storage at '{location}': {reason}")]
    Open { location: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key from storage.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// Failed to list or count keys with the given prefix.
    #[error("failed to list keys with prefix '{prefix}': {reason}")]
    List { prefix: String, reason: String },
}

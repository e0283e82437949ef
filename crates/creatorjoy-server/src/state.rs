//! Shared application state for the CreatorJoy server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;

use creatorjoy_core::boost::BoostGenerator;
use creatorjoy_core::history::HistoryStore;
use creatorjoy_core::style::StyleStore;
use creatorjoy_storage::StorageBackend;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Style profile CRUD.
    pub styles: Arc<StyleStore>,
    /// Boost history reads and workflow ingestion.
    pub history: Arc<HistoryStore>,
    /// Webhook client (None if no webhook is configured).
    pub generator: Option<BoostGenerator>,
}

impl AppState {
    /// Build both stores over one storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, generator: Option<BoostGenerator>) -> Self {
        Self {
            styles: Arc::new(StyleStore::new(Arc::clone(&storage))),
            history: Arc::new(HistoryStore::new(storage)),
            generator,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("generator", &self.generator.is_some())
            .finish_non_exhaustive()
    }
}

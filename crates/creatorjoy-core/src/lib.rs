//! Core library for CreatorJoy.
//!
//! Contains the style profile store, the read side of the boost history, the
//! webhook-backed boost generator, and the dashboard statistics and
//! view-model. Persistence goes through the `creatorjoy-storage` backend
//! trait; generation goes through a single outbound HTTP call.

pub mod boost;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod models;
pub mod style;

//! CreatorJoy HTTP server.
//!
//! Exposes the style store, boost history, dashboard statistics and the boost
//! generator as a JSON API under `/v1/*` for the dashboard front end.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

//! Server configuration for CreatorJoy.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `CREATORJOY_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use creatorjoy_core::boost::DEFAULT_TIMEOUT;

const DEFAULT_PORT: u16 = 8300;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Generation webhook. Boost generation is disabled when unset.
    pub webhook_url: Option<String>,
    /// Deadline for one boost generation.
    pub boost_timeout: Duration,
    /// Allowed CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// PostgreSQL persistent storage.
    Postgres { url: String },
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `CREATORJOY_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `CREATORJOY_STORAGE`: `memory` or `postgres` (default: `memory`)
    /// - `DATABASE_URL`: PostgreSQL connection string (used when `CREATORJOY_STORAGE=postgres`)
    /// - `CREATORJOY_LOG_LEVEL`: log filter (default: `info`)
    /// - `CREATORJOY_WEBHOOK_URL`: generation webhook (optional)
    /// - `CREATORJOY_BOOST_TIMEOUT_MS`: generation deadline (default: `60000`)
    /// - `CREATORJOY_CORS_ORIGIN`: allowed origin (default: any)
    #[must_use]
    pub fn from_env() -> Self {
        // Priority: CREATORJOY_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Ok(addr) = std::env::var("CREATORJOY_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let storage_backend = match std::env::var("CREATORJOY_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => {
                let url = std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/creatorjoy".to_owned());
                StorageBackendType::Postgres { url }
            }
            _ => StorageBackendType::Memory,
        };

        let log_level = std::env::var("CREATORJOY_LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_owned());

        let boost_timeout = std::env::var("CREATORJOY_BOOST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);

        Self {
            bind_addr,
            storage_backend,
            log_level,
            webhook_url: non_empty_var("CREATORJOY_WEBHOOK_URL"),
            boost_timeout,
            cors_origin: non_empty_var("CREATORJOY_CORS_ORIGIN"),
        }
    }
}

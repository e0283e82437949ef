//! CreatorJoy server entry point.
//!
//! Bootstraps the storage backend, the stores and the boost generator, then
//! starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use creatorjoy_core::boost::{BoostConfig, BoostGenerator};
use creatorjoy_storage::{MemoryBackend, StorageBackend};

use creatorjoy_server::config::{ServerConfig, StorageBackendType};
use creatorjoy_server::routes;
use creatorjoy_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = %redacted(&config.storage_backend), "CreatorJoy starting");

    let state = build_app_state(&config).await?;
    let app = routes::build_router(state, config.cors_origin.as_deref());

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "CreatorJoy server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("CreatorJoy server stopped");
    Ok(())
}

/// Storage type for logging, without connection strings.
fn redacted(backend: &StorageBackendType) -> &'static str {
    match backend {
        StorageBackendType::Memory => "memory",
        StorageBackendType::Postgres { .. } => "postgres",
    }
}

async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryBackend::new())
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { url } => {
            info!(url = %"[redacted]", "using PostgreSQL storage");
            Arc::new(
                creatorjoy_storage::PostgresBackend::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL storage")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!(
                "PostgreSQL backend requested but feature 'postgres-backend' is not enabled"
            );
        }
    };

    let generator = match &config.webhook_url {
        Some(url) => {
            let generator = BoostGenerator::with_config(BoostConfig {
                webhook_url: url.clone(),
                timeout: config.boost_timeout,
                ..BoostConfig::default()
            })
            .context("failed to build boost generator")?;
            info!(
                timeout_ms = config.boost_timeout.as_millis(),
                "boost generation enabled"
            );
            Some(generator)
        }
        None => {
            warn!("CREATORJOY_WEBHOOK_URL not set; boost generation disabled");
            None
        }
    };

    Ok(Arc::new(AppState::new(storage, generator)))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}

//! Category service binary
//!
//! - Loads configuration from `config.toml` (or `$CATEGORY_CONFIG`) and `CATEGORY_*` env vars
//! - Opens one storage session for the whole process
//! - Serves the category routes until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use category_service::config::{ConfigStore, LogConfig, ServerConfig, StoreConfig};
use category_service::{AppState, CategoryRepository, Session, category_router, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigStore::load()?;

    let log: LogConfig = config.get()?;
    let _log_guard = telemetry::init(&log)?;

    info!("Starting category service...");

    let store: StoreConfig = config.get()?;
    let session = Session::open(&store)
        .await
        .context("failed to open storage session")?;
    if store.create_table {
        session
            .ensure_table()
            .await
            .context("failed to create categories table")?;
    }

    info!(keyspace = session.keyspace(), "Using keyspace");
    let repository = CategoryRepository::new(Arc::new(session));
    let app = category_router(AppState::new(repository));

    let server: ServerConfig = config.get()?;
    let addr = server.addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}, press Ctrl+C to exit.", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Category service is shutting down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}

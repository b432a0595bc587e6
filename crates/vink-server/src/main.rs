//! # vink-server
//!
//! Self-destructing content sharing service.
//!
//! This binary provides:
//! - **REST API** (axum) for creating vanish records (text or file uploads)
//!   and reading them back by their short public id
//! - **Disk blob storage** for uploaded files, served under `/files/{id}`
//! - **Lazy expiry and one-time-read enforcement** on the read path
//! - **Background reaper** that bulk-deletes expired records on a schedule

mod api;
mod blob_store;
mod config;
mod error;
mod expiry;
mod ident;
mod reaper;
mod service;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vink_store::Database;

use crate::api::AppState;
use crate::blob_store::BlobStore;
use crate::config::ServerConfig;
use crate::service::{SystemClock, VanishService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vink_server=debug")),
        )
        .init();

    info!("Starting vink server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Database (platform default location unless DATABASE_PATH is set)
    let database = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    // Blob store (creates directory if missing)
    let blob_store = Arc::new(
        BlobStore::new(
            config.blob_storage_path.clone(),
            config.public_base_url.clone(),
            config.max_upload_size,
        )
        .await?,
    );

    // Lifecycle service
    let service = Arc::new(VanishService::new(
        Arc::new(Mutex::new(database)),
        blob_store.clone(),
        Arc::new(SystemClock),
    ));

    // -----------------------------------------------------------------------
    // 4. Spawn the background reaper
    // -----------------------------------------------------------------------
    reaper::spawn(service.clone(), config.reaper_interval);

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    let app_state = AppState {
        service,
        blob_store,
        config: Arc::new(config),
    };

    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

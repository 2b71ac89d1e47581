//! Stockroom Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - STOCKROOM_HOST: Bind address (default: 0.0.0.0)
//! - STOCKROOM_PORT: Port number (default: 50051)
//! - STOCKROOM_DATA: JSON file with the initial inventory rows (default: inventory.json)
//! - STOCKROOM_SNAPSHOT: File rewritten after every update (default: STOCKROOM_DATA)
//! - RUST_LOG: Log level (default: info)

use std::path::PathBuf;
use stockroom::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let defaults = ServerConfig::default();

    let host = std::env::var("STOCKROOM_HOST").unwrap_or(defaults.host);
    let port: u16 = std::env::var("STOCKROOM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults.port);
    let data_path = std::env::var("STOCKROOM_DATA")
        .map(PathBuf::from)
        .unwrap_or(defaults.data_path);
    // Updates overwrite the source unless told otherwise
    let snapshot_path = std::env::var("STOCKROOM_SNAPSHOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_path.clone());

    let config = ServerConfig {
        host,
        port,
        data_path,
        snapshot_path,
    };

    tracing::info!("Stockroom configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Data: {}", config.data_path.display());
    tracing::info!("  Snapshot: {}", config.snapshot_path.display());

    run_server(config).await
}

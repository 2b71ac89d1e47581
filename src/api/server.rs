use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_check, percentile, search, search_by_id, search_range, search_row_by_id, stats, update,
    AppState,
};
use crate::storage::{load_table, InventoryEngine, JsonFileSink};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Initial record source
    pub data_path: PathBuf,
    /// Where snapshots are written after each update
    pub snapshot_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
            data_path: PathBuf::from("inventory.json"),
            snapshot_path: PathBuf::from("inventory.json"),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Queries
        .route("/search/id", post(search_by_id))
        .route("/search/id/row", post(search_row_by_id))
        .route("/search", post(search))
        .route("/search/range", post(search_range))
        .route("/percentile", post(percentile))
        // Mutation
        .route("/update", post(update))
        // Stats
        .route("/stats", get(stats))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(&config.data_path)?;
    tracing::info!(
        "Loaded {} records ({} columns) from {}",
        table.records.len(),
        table.columns.len(),
        config.data_path.display()
    );

    let sink = Arc::new(JsonFileSink::new(&config.snapshot_path));
    let engine = Arc::new(InventoryEngine::from_table(table, sink));
    let state = Arc::new(AppState { engine });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting Stockroom server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stockroom server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::data::record::record_to_json;
use crate::data::{InventoryRecord, Value};
use crate::query::{QueryError, RangeBounds};
use crate::storage::{InventoryEngine, SnapshotMetadata, UpdateError, UpdateRequest};

/// Application state shared across handlers
pub struct AppState {
    pub engine: Arc<InventoryEngine>,
}

/// Text form of a wire value; strings pass through unquoted
fn wire_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => Value::from_json(other).to_string(),
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Lookups
// ============================================================================

#[derive(Deserialize)]
pub struct IdRequest {
    pub id: serde_json::Value,
}

pub async fn search_by_id(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdRequest>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let id = Value::from_json(&request.id);
    Ok(Json(state.engine.search_by_id(&id)?))
}

pub async fn search_row_by_id(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdRequest>,
) -> Result<Json<serde_json::Map<String, serde_json::Value>>, ApiError> {
    let id = Value::from_json(&request.id);
    let row = state.engine.search_row_by_id(&id)?;
    Ok(Json(record_to_json(&row)))
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub key_name: String,
    pub key_value: serde_json::Value,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let value = wire_text(&request.key_value);
    Ok(Json(state.engine.search(&request.key_name, &value)?))
}

// ============================================================================
// Range Scan
// ============================================================================

#[derive(Deserialize)]
pub struct RangeRequest {
    pub key_name: String,
    pub key_value_start: serde_json::Value,
    pub key_value_end: serde_json::Value,
}

/// Streams matching records as newline-delimited JSON.
///
/// The scan runs on a blocking worker and hands each record to the
/// response body as soon as it qualifies. A record that cannot be typed
/// ends the stream with an `{"error": ...}` line.
pub async fn search_range(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RangeRequest>,
) -> Result<Response, ApiError> {
    let bounds = RangeBounds::parse(
        &wire_text(&request.key_value_start),
        &wire_text(&request.key_value_end),
    )
    .map_err(|e| ApiError::Conversion(e.to_string()))?;

    let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Bytes, Infallible>>();
    let engine = Arc::clone(&state.engine);
    let field = request.key_name;

    tokio::task::spawn_blocking(move || {
        engine.scan_range(&field, bounds, |record| {
            let (line, keep_going) = match InventoryRecord::from_record(record) {
                Ok(typed) => (serde_json::to_vec(&typed), true),
                Err(e) => {
                    tracing::warn!("Range scan on '{}' stopped: {}", field, e);
                    (serde_json::to_vec(&serde_json::json!({ "error": e.to_string() })), false)
                }
            };
            let mut line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to encode range result: {}", e);
                    return false;
                }
            };
            line.push(b'\n');
            // A closed channel means the caller went away
            tx.unbounded_send(Ok(Bytes::from(line))).is_ok() && keep_going
        });
    });

    Ok((
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(rx),
    )
        .into_response())
}

// ============================================================================
// Percentile
// ============================================================================

#[derive(Deserialize)]
pub struct PercentileRequest {
    pub key_name: String,
    pub percentile: f64,
}

#[derive(Serialize)]
pub struct PercentileResponse {
    pub value: f64,
}

pub async fn percentile(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PercentileRequest>,
) -> Result<Json<PercentileResponse>, ApiError> {
    let value = state
        .engine
        .percentile(&request.key_name, request.percentile)?;
    Ok(Json(PercentileResponse { value }))
}

// ============================================================================
// Update
// ============================================================================

#[derive(Deserialize)]
pub struct UpdateBody {
    pub key_name: String,
    pub key_value: serde_json::Value,
    pub val_name: String,
    pub val_val_new: serde_json::Value,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let request = UpdateRequest {
        key_name: body.key_name,
        key_value: Value::from_json(&body.key_value),
        val_name: body.val_name,
        new_value: Value::from_json(&body.val_val_new),
    };

    // Snapshot writes block; keep them off the async workers
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || engine.update(&request))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(UpdateResponse { success: true }))
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Serialize)]
pub struct StatsResponse {
    pub record_count: usize,
    pub columns: Vec<String>,
    pub last_snapshot: Option<SnapshotMetadata>,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        record_count: state.engine.len(),
        columns: state.engine.columns(),
        last_snapshot: state.engine.latest_snapshot(),
    })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conversion(String),
    Persistence(String),
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound(msg) => ApiError::NotFound(msg),
            QueryError::Conversion(e) => ApiError::Conversion(e.to_string()),
        }
    }
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            UpdateError::Persistence(_) => ApiError::Persistence(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conversion(msg) => (StatusCode::BAD_REQUEST, "conversion", msg),
            ApiError::Persistence(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        let body = serde_json::json!({
            "error": message,
            "kind": kind,
        });

        (status, Json(body)).into_response()
    }
}

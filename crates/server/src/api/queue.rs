//! Queue API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tubestream_core::{ItemUpdate, QueueCounts, QueueError, QueueItem};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for enqueueing links
#[derive(Debug, Deserialize)]
pub struct EnqueueBody {
    /// Newline-separated source links; blank lines are ignored
    pub links: String,
}

/// Response for listing the queue
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub items: Vec<QueueItem>,
    pub counts: QueueCounts,
    /// Whether a batch is running (queue locked)
    pub running: bool,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub items: Vec<QueueItem>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

fn queue_error(err: QueueError) -> ApiError {
    error_response(StatusCode::CONFLICT, err.to_string())
}

fn not_found(id: &str) -> ApiError {
    error_response(StatusCode::NOT_FOUND, format!("Queue item not found: {}", id))
}

// ============================================================================
// Handlers
// ============================================================================

/// List all items in queue order
pub async fn list_queue(State(state): State<Arc<AppState>>) -> Json<QueueResponse> {
    let queue = state.queue();
    Json(QueueResponse {
        items: queue.list(),
        counts: queue.counts(),
        running: queue.is_batch_active(),
    })
}

/// Enqueue one item per non-blank line
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnqueueBody>,
) -> (StatusCode, Json<EnqueueResponse>) {
    let items = state.queue().enqueue(&body.links);
    (StatusCode::CREATED, Json(EnqueueResponse { items }))
}

/// Remove every item
pub async fn clear_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, ApiError> {
    let removed = state.queue().clear().map_err(queue_error)?;
    Ok(Json(ClearResponse { removed }))
}

/// Get a single item
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QueueItem>, ApiError> {
    state
        .queue()
        .get(&id)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// Edit an item's metadata
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ItemUpdate>,
) -> Result<Json<QueueItem>, ApiError> {
    match state.queue().update(&id, update) {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(not_found(&id)),
        Err(e) => Err(queue_error(e)),
    }
}

/// Remove a single item
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.queue().remove(&id) {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found(&id)),
        Err(e) => Err(queue_error(e)),
    }
}

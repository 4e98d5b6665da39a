//! Batch API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use tubestream_core::{OrchestratorError, OrchestratorStatus};

use super::handlers::error_response;
use crate::state::AppState;

/// Returned when the batch was started in the background
#[derive(Debug, Serialize)]
pub struct BatchStartedResponse {
    pub message: String,
    /// Items in the queue when the batch started
    pub items: usize,
}

/// Returned when the user must grant consent before a batch can run
#[derive(Debug, Serialize)]
pub struct AuthenticationRequiredResponse {
    pub error: String,
    pub authorization_url: String,
    pub state: String,
}

/// Start a batch over the current queue
pub async fn start_batch(State(state): State<Arc<AppState>>) -> Response {
    let items = state.queue().len();

    match state.orchestrator().spawn_batch().await {
        Ok(handle) => {
            tokio::spawn(async move {
                match handle.await {
                    Ok(summary) => info!(
                        "Background batch done: {} completed, {} failed",
                        summary.completed, summary.failed
                    ),
                    Err(e) => error!("Batch task panicked: {}", e),
                }
            });
            (
                StatusCode::ACCEPTED,
                Json(BatchStartedResponse {
                    message: "Batch started".to_string(),
                    items,
                }),
            )
                .into_response()
        }
        Err(OrchestratorError::AuthenticationRequired(request)) => (
            StatusCode::UNAUTHORIZED,
            Json(AuthenticationRequiredResponse {
                error: "Authentication required".to_string(),
                authorization_url: request.authorization_url,
                state: request.state,
            }),
        )
            .into_response(),
        Err(e @ OrchestratorError::AlreadyRunning) => {
            error_response(StatusCode::CONFLICT, e.to_string()).into_response()
        }
        Err(e @ OrchestratorError::Auth(_)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

/// Current batch and queue status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status())
}

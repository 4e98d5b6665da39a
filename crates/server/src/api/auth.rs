//! Upload credential handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tubestream_core::{AuthError, ConsentRequest, ConsentResponse, CredentialStatus};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Configuration(_) | AuthError::StateMismatch => StatusCode::BAD_REQUEST,
        AuthError::ConsentDenied(_) => StatusCode::FORBIDDEN,
        AuthError::RevokeFailed(_) | AuthError::Http(_) => StatusCode::BAD_GATEWAY,
    };
    warn!("Credential request failed: {}", err);
    error_response(status, err.to_string())
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<CredentialStatus> {
    Json(state.credentials().status())
}

/// Start a consent flow and return the URL to present to the user
pub async fn request_consent(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConsentRequest>, ApiError> {
    let credentials = state.credentials();
    credentials.ensure_ready().await.map_err(auth_error)?;
    let request = credentials.request_credential().await.map_err(auth_error)?;
    Ok(Json(request))
}

/// Complete a consent flow with the provider's response
pub async fn consent_callback(
    State(state): State<Arc<AppState>>,
    Json(response): Json<ConsentResponse>,
) -> Result<Json<CredentialStatus>, ApiError> {
    let credentials = state.credentials();
    credentials
        .complete_consent(response)
        .await
        .map_err(auth_error)?;
    info!("Upload credential granted");
    Ok(Json(credentials.status()))
}

pub async fn revoke(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.credentials().revoke().await.map_err(auth_error)?;
    Ok(Json(MessageResponse {
        message: "Credential revoked".to_string(),
    }))
}

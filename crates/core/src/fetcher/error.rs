//! Error types for the fetcher module.

use thiserror::Error;

/// Errors that can occur while downloading a source payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source host answered with a non-success status.
    #[error("Failed to fetch file: {status_text}")]
    Status { status: u16, status_text: String },

    /// No response was received.
    #[error("Network error while fetching file: {0}")]
    Network(String),

    /// The response body could not be read to the end.
    #[error("Failed to read file body: {0}")]
    Body(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Build a `Status` error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        }
    }
}

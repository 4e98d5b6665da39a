//! Error types for the uploader module.

use thiserror::Error;

/// Errors that can occur while submitting a video.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The session initiation request was rejected.
    #[error("{message}")]
    SessionInitiation { status: u16, message: String },

    /// Initiation succeeded but no session endpoint came back.
    #[error("No upload session URL received")]
    MissingSessionUrl,

    /// The bulk transfer was rejected.
    #[error("Upload failed with status {status}: {body}")]
    Transfer { status: u16, body: String },

    /// No response was received.
    #[error("Network error during upload: {0}")]
    Network(String),

    /// A success response without a usable video id.
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Cut `text` to at most `max_bytes` on a char boundary, marking the cut with `…`.
pub fn truncate_with_ellipsis(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

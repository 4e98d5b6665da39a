//! Upload submitter: publishes fetched payloads through a resumable session.
//!
//! The protocol is two requests: a metadata-only POST that opens a session
//! (its URL comes back in `Location`), then a single PUT carrying the whole
//! payload.

mod config;
mod error;
mod traits;
mod types;
mod youtube;

pub use config::UploaderConfig;
pub use error::{truncate_with_ellipsis, UploadError};
pub use traits::Uploader;
pub use types::{
    ApiErrorBody, ApiErrorDetail, InitiateUploadBody, UploadedVideo, VideoMetadata, VideoSnippet,
    VideoStatus,
};
pub use youtube::YouTubeUploader;

//! Trait definitions for the uploader module.

use async_trait::async_trait;

use super::error::UploadError;
use super::types::VideoMetadata;
use crate::auth::Credential;
use crate::fetcher::FetchedPayload;
use crate::progress::SharedProgress;

/// Publishes a payload to the video platform.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Returns the name of this uploader implementation.
    fn name(&self) -> &str;

    /// Upload `payload` and return the id assigned by the platform.
    ///
    /// Progress covers the payload transfer only. No retries.
    async fn submit(
        &self,
        payload: &FetchedPayload,
        metadata: &VideoMetadata,
        credential: &Credential,
        progress: SharedProgress,
    ) -> Result<String, UploadError>;
}

//! Trait definitions for the fetcher module.

use async_trait::async_trait;

use super::error::FetchError;
use super::types::FetchedPayload;
use crate::auth::Credential;
use crate::progress::SharedProgress;

/// Downloads the payload behind a source reference.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetch the payload behind `source`.
    ///
    /// Reports percent complete to `progress` when the total size is known.
    /// The credential is only used for hosts that require it. Failures are
    /// returned as-is, never retried.
    async fn fetch(
        &self,
        source: &str,
        credential: Option<&Credential>,
        progress: SharedProgress,
    ) -> Result<FetchedPayload, FetchError>;
}

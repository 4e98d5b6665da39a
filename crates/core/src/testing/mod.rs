//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline traits, so batch
//! behavior can be exercised without any network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubestream_core::testing::{MockCredentialSupplier, MockFetcher, MockUploader};
//!
//! let fetcher = MockFetcher::new();
//! let uploader = MockUploader::new();
//! let credentials = MockCredentialSupplier::authenticated();
//!
//! // Configure mock responses
//! fetcher.fail_source("https://x.test/gone.mp4", 404).await;
//! uploader.set_next_error(UploadError::MissingSessionUrl).await;
//!
//! // Use in BatchOrchestrator...
//! ```

mod mock_credentials;
mod mock_fetcher;
mod mock_uploader;

pub use mock_credentials::MockCredentialSupplier;
pub use mock_fetcher::{MockFetcher, RecordedFetch};
pub use mock_uploader::{MockUploader, RecordedSubmission};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::auth::Credential;
    use crate::fetcher::FetchedPayload;

    /// A payload of `len` bytes declared as MP4.
    pub fn payload(len: usize) -> FetchedPayload {
        FetchedPayload::new(vec![0u8; len], Some("video/mp4".to_string()))
    }

    /// A credential valid for one hour.
    pub fn credential() -> Credential {
        Credential::new("ya29.mock-token", chrono::Duration::hours(1))
    }

    /// A credential that has already expired.
    pub fn expired_credential() -> Credential {
        Credential::new("ya29.expired", chrono::Duration::seconds(-60))
    }

    /// Newline-separated links `https://videos.test/clip-<n>.mp4`.
    pub fn links(count: usize) -> String {
        (1..=count)
            .map(|n| format!("https://videos.test/clip-{}.mp4", n))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! Mock fetcher for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::auth::Credential;
use crate::fetcher::{FetchError, FetchedPayload, Fetcher};
use crate::progress::SharedProgress;

/// A recorded fetch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// The source reference that was requested.
    pub source: String,
    /// Whether a credential was passed along.
    pub with_credential: bool,
    /// Whether the fetch succeeded.
    pub success: bool,
    /// When the fetch was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Track fetched sources for assertions
/// - Serve configured payloads per source
/// - Simulate HTTP status failures per source
/// - Script the progress percentages reported
///
/// # Example
///
/// ```rust,ignore
/// use tubestream_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.fail_source("https://x.test/missing.mp4", 404).await;
///
/// // Run a batch...
///
/// let fetches = fetcher.recorded_fetches().await;
/// assert!(!fetches[0].success);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Payloads by source; unknown sources get the default payload.
    payloads: Arc<RwLock<HashMap<String, FetchedPayload>>>,
    /// Sources answered with an HTTP status failure.
    failing_sources: Arc<RwLock<HashMap<String, u16>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Percentages reported during each fetch.
    progress_steps: Arc<RwLock<Vec<u8>>>,
    /// Simulated fetch duration in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            payloads: Arc::new(RwLock::new(HashMap::new())),
            failing_sources: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            progress_steps: Arc::new(RwLock::new(vec![25, 50, 75, 100])),
            delay_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Serve `payload` for `source`.
    pub async fn set_payload(&self, source: &str, payload: FetchedPayload) {
        self.payloads
            .write()
            .await
            .insert(source.to_string(), payload);
    }

    /// Answer `source` with the given HTTP status.
    pub async fn fail_source(&self, source: &str, status: u16) {
        self.failing_sources
            .write()
            .await
            .insert(source.to_string(), status);
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the percentages reported during each fetch.
    pub async fn set_progress_steps(&self, steps: Vec<u8>) {
        *self.progress_steps.write().await = steps;
    }

    /// Set the simulated fetch duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    async fn record(&self, source: &str, with_credential: bool, success: bool) {
        self.fetches.write().await.push(RecordedFetch {
            source: source.to_string(),
            with_credential,
            success,
            timestamp: Utc::now(),
        });
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        source: &str,
        credential: Option<&Credential>,
        progress: SharedProgress,
    ) -> Result<FetchedPayload, FetchError> {
        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.record(source, credential.is_some(), false).await;
            return Err(err);
        }

        if let Some(status) = self.failing_sources.read().await.get(source).copied() {
            self.record(source, credential.is_some(), false).await;
            let status = reqwest::StatusCode::from_u16(status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(FetchError::from_status(status));
        }

        for step in self.progress_steps.read().await.iter() {
            progress.report(*step);
        }

        let payload = self
            .payloads
            .read()
            .await
            .get(source)
            .cloned()
            .unwrap_or_else(|| fixtures::payload(1024));

        self.record(source, credential.is_some(), true).await;
        Ok(payload)
    }
}

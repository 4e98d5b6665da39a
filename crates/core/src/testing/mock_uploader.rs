//! Mock uploader for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::Credential;
use crate::fetcher::FetchedPayload;
use crate::progress::SharedProgress;
use crate::uploader::{UploadError, Uploader, VideoMetadata};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// Metadata sent with the upload.
    pub metadata: VideoMetadata,
    /// Payload size in bytes.
    pub payload_len: usize,
    /// Content type declared by the fetched payload.
    pub content_type: Option<String>,
    /// Token the upload was authorized with.
    pub access_token: String,
    /// Video id returned, if the upload succeeded.
    pub video_id: Option<String>,
}

/// Mock implementation of the Uploader trait.
///
/// Provides controllable behavior for testing:
/// - Track submissions for assertions
/// - Simulate failures
/// - Script the progress percentages reported
///
/// Successful uploads get ids `mock-video-1`, `mock-video-2`, ...
#[derive(Debug)]
pub struct MockUploader {
    /// Recorded submissions.
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    /// If set, the next submission will fail with this error.
    next_error: Arc<RwLock<Option<UploadError>>>,
    /// Percentages reported during each transfer.
    progress_steps: Arc<RwLock<Vec<u8>>>,
    /// Counter for generating unique ids.
    id_counter: Arc<RwLock<u32>>,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUploader {
    /// Create a new mock uploader.
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            progress_steps: Arc::new(RwLock::new(vec![10, 60, 100])),
            id_counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Get all recorded submissions.
    pub async fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: UploadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the percentages reported during each transfer.
    pub async fn set_progress_steps(&self, steps: Vec<u8>) {
        *self.progress_steps.write().await = steps;
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(
        &self,
        payload: &FetchedPayload,
        metadata: &VideoMetadata,
        credential: &Credential,
        progress: SharedProgress,
    ) -> Result<String, UploadError> {
        let mut record = RecordedSubmission {
            metadata: metadata.clone(),
            payload_len: payload.len(),
            content_type: payload.content_type.clone(),
            access_token: credential.access_token.clone(),
            video_id: None,
        };

        if let Some(err) = self.next_error.write().await.take() {
            self.submissions.write().await.push(record);
            return Err(err);
        }

        for step in self.progress_steps.read().await.iter() {
            progress.report(*step);
        }

        let video_id = {
            let mut counter = self.id_counter.write().await;
            *counter += 1;
            format!("mock-video-{}", *counter)
        };

        record.video_id = Some(video_id.clone());
        self.submissions.write().await.push(record);
        Ok(video_id)
    }
}

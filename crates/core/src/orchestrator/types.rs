//! Types for the batch orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthError, ConsentRequest};
use crate::fetcher::FetchError;
use crate::queue::QueueCounts;
use crate::uploader::UploadError;

/// Errors that stop a batch before any item is touched.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No valid credential; the user must grant consent and start again.
    #[error("authentication required")]
    AuthenticationRequired(Box<ConsentRequest>),

    /// The credential supplier could not start a consent flow.
    #[error("credential supplier error: {0}")]
    Auth(#[from] AuthError),

    /// Another batch holds the queue.
    #[error("a batch is already running")]
    AlreadyRunning,
}

/// Failure of a single item. Recorded on the item; never stops the batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The item was moved out of `Fetching` while its payload downloaded.
    #[error("item left the fetch phase before upload")]
    PhaseInterrupted,
}

impl PipelineError {
    /// Phase the item was in when it failed.
    pub fn phase(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) | PipelineError::PhaseInterrupted => "fetch",
            PipelineError::Upload(_) => "upload",
        }
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items driven through the pipeline.
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    /// Items already completed, or no longer eligible.
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStatus {
    /// Whether a batch is running.
    pub running: bool,
    /// Item counts per state.
    #[serde(flatten)]
    pub queue: QueueCounts,
    /// Summary of the most recent finished batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_batch: Option<BatchSummary>,
}

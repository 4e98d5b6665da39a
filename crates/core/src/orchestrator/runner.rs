//! Batch orchestrator implementation.
//!
//! Items are processed strictly one after another, one phase at a time, so
//! progress reports never interleave and a single credential serves the
//! whole run.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::{Credential, CredentialSupplier};
use crate::fetcher::Fetcher;
use crate::metrics::{BATCH_RUNS, ITEMS_COMPLETED, ITEMS_FAILED};
use crate::progress::SharedProgress;
use crate::queue::{BatchGuard, QueueItem, UploadQueue, UploadStatus};
use crate::uploader::{truncate_with_ellipsis, Uploader, VideoMetadata};

use super::config::OrchestratorConfig;
use super::types::{BatchSummary, OrchestratorError, OrchestratorStatus, PipelineError};

/// A batch that passed its preconditions and holds the queue.
struct PreparedBatch {
    _guard: BatchGuard,
    credential: Credential,
    item_ids: Vec<String>,
}

/// What happened to one item during a run.
enum ItemOutcome {
    Completed,
    Failed,
    Skipped,
}

/// The batch orchestrator - drives queue items through fetch and upload.
pub struct BatchOrchestrator {
    config: OrchestratorConfig,
    queue: Arc<UploadQueue>,
    fetcher: Arc<dyn Fetcher>,
    uploader: Arc<dyn Uploader>,
    credentials: Arc<dyn CredentialSupplier>,
    last_batch: RwLock<Option<BatchSummary>>,
}

impl BatchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        queue: Arc<UploadQueue>,
        fetcher: Arc<dyn Fetcher>,
        uploader: Arc<dyn Uploader>,
        credentials: Arc<dyn CredentialSupplier>,
    ) -> Self {
        Self {
            config,
            queue,
            fetcher,
            uploader,
            credentials,
            last_batch: RwLock::new(None),
        }
    }

    pub fn queue(&self) -> &Arc<UploadQueue> {
        &self.queue
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialSupplier> {
        &self.credentials
    }

    pub fn is_running(&self) -> bool {
        self.queue.is_batch_active()
    }

    /// Get current orchestrator status.
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            running: self.is_running(),
            queue: self.queue.counts(),
            last_batch: self
                .last_batch
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Run a batch to completion.
    ///
    /// Fails without touching any item when a batch is already running or no
    /// valid credential is available. In the latter case the error carries
    /// the consent request to show the user; the batch must be started again
    /// once consent is granted.
    pub async fn run_batch(&self) -> Result<BatchSummary, OrchestratorError> {
        let batch = self.prepare().await?;
        Ok(self.execute(batch).await)
    }

    /// Check preconditions, then run the batch on a background task.
    pub async fn spawn_batch(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<BatchSummary>, OrchestratorError> {
        let batch = self.prepare().await?;
        let orchestrator = Arc::clone(self);
        Ok(tokio::spawn(async move { orchestrator.execute(batch).await }))
    }

    async fn prepare(&self) -> Result<PreparedBatch, OrchestratorError> {
        let Some(guard) = self.queue.try_begin_batch() else {
            warn!("Batch requested while another is running");
            BATCH_RUNS.with_label_values(&["already_running"]).inc();
            return Err(OrchestratorError::AlreadyRunning);
        };

        let credential = match self.credentials.current() {
            Some(credential) => credential,
            None => {
                let request = async {
                    self.credentials.ensure_ready().await?;
                    self.credentials.request_credential().await
                }
                .await
                .map_err(|e| {
                    BATCH_RUNS.with_label_values(&["auth_error"]).inc();
                    OrchestratorError::Auth(e)
                })?;

                info!("No valid credential, batch paused until consent is granted");
                BATCH_RUNS.with_label_values(&["auth_required"]).inc();
                return Err(OrchestratorError::AuthenticationRequired(Box::new(request)));
            }
        };

        Ok(PreparedBatch {
            _guard: guard,
            credential,
            item_ids: self.queue.ids(),
        })
    }

    async fn execute(&self, batch: PreparedBatch) -> BatchSummary {
        let started_at = Utc::now();
        info!("Starting batch over {} item(s)", batch.item_ids.len());

        let mut summary = BatchSummary {
            processed: 0,
            completed: 0,
            failed: 0,
            skipped: 0,
            started_at,
            finished_at: started_at,
        };

        for id in &batch.item_ids {
            match self.process_item(id, &batch.credential).await {
                ItemOutcome::Completed => {
                    summary.processed += 1;
                    summary.completed += 1;
                }
                ItemOutcome::Failed => {
                    summary.processed += 1;
                    summary.failed += 1;
                }
                ItemOutcome::Skipped => summary.skipped += 1,
            }
        }

        summary.finished_at = Utc::now();
        info!(
            "Batch finished: {} completed, {} failed, {} skipped",
            summary.completed, summary.failed, summary.skipped
        );
        BATCH_RUNS.with_label_values(&["finished"]).inc();

        *self
            .last_batch
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
        summary
    }

    async fn process_item(&self, id: &str, credential: &Credential) -> ItemOutcome {
        let Some(item) = self.queue.get(id) else {
            debug!("Item {} left the queue before processing", id);
            return ItemOutcome::Skipped;
        };
        if item.status == UploadStatus::Completed {
            debug!("Skipping completed item {}", id);
            return ItemOutcome::Skipped;
        }
        if !self.queue.start_phase(id, UploadStatus::Fetching) {
            return ItemOutcome::Skipped;
        }

        match self.run_pipeline(&item, credential).await {
            Ok(remote_id) => {
                self.queue.mark_completed(id, remote_id);
                ITEMS_COMPLETED.inc();
                ItemOutcome::Completed
            }
            Err(e) => {
                warn!("Item {} failed during {}: {}", id, e.phase(), e);
                ITEMS_FAILED.with_label_values(&[e.phase()]).inc();
                let message = truncate_with_ellipsis(&e.to_string(), self.config.max_error_len);
                self.queue.mark_failed(id, message);
                ItemOutcome::Failed
            }
        }
    }

    /// Fetch then upload one item. The item is already `Fetching`.
    async fn run_pipeline(
        &self,
        item: &QueueItem,
        credential: &Credential,
    ) -> Result<String, PipelineError> {
        info!("Fetching {} ({})", item.title, item.source_url);
        let payload = self
            .fetcher
            .fetch(&item.source_url, Some(credential), self.progress_sink(&item.id))
            .await?;

        if !self.queue.start_phase(&item.id, UploadStatus::Uploading) {
            return Err(PipelineError::PhaseInterrupted);
        }
        let metadata = self
            .queue
            .get(&item.id)
            .map(|current| VideoMetadata::from(&current))
            .unwrap_or_else(|| VideoMetadata::from(item));

        info!("Uploading {} ({} bytes)", metadata.title, payload.len());
        let remote_id = self
            .uploader
            .submit(&payload, &metadata, credential, self.progress_sink(&item.id))
            .await?;

        Ok(remote_id)
    }

    /// Progress sink writing into the item's record.
    fn progress_sink(&self, id: &str) -> SharedProgress {
        let queue = Arc::clone(&self.queue);
        let id = id.to_string();
        Arc::new(move |percent: u8| {
            queue.set_progress(&id, percent);
        })
    }
}

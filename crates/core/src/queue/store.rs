//! In-memory upload queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::QueueConfig;
use super::types::{ItemUpdate, QueueError, QueueEvent, QueueItem, UploadStatus};
use crate::metrics::ITEMS_ENQUEUED;

/// Callback invoked after every queue change.
pub type QueueUpdateCallback = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Item counts per lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub total: usize,
    pub idle: usize,
    pub fetching: usize,
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Ordered list of queued transfers.
///
/// Users add, edit and remove items; the orchestrator owns the lifecycle
/// fields. A single batch flag gates destructive mutations while a run is
/// in progress.
pub struct UploadQueue {
    config: QueueConfig,
    items: RwLock<Vec<QueueItem>>,
    batch_active: AtomicBool,
    on_update: Option<QueueUpdateCallback>,
}

impl std::fmt::Debug for UploadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadQueue")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("batch_active", &self.is_batch_active())
            .finish()
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl UploadQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            items: RwLock::new(Vec::new()),
            batch_active: AtomicBool::new(false),
            on_update: None,
        }
    }

    /// Register a callback notified after each change.
    pub fn with_update_callback(mut self, callback: QueueUpdateCallback) -> Self {
        self.on_update = Some(callback);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<QueueItem>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<QueueItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: QueueEvent) {
        if let Some(ref callback) = self.on_update {
            callback(&event);
        }
    }

    /// Parse pasted text into new items, one per non-blank line.
    ///
    /// Links are not checked for reachability.
    pub fn enqueue(&self, raw_text: &str) -> Vec<QueueItem> {
        let new_items: Vec<QueueItem> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|url| self.new_item(url))
            .collect();

        if new_items.is_empty() {
            return new_items;
        }

        self.write().extend(new_items.iter().cloned());
        ITEMS_ENQUEUED.inc_by(new_items.len() as u64);
        info!("Enqueued {} link(s)", new_items.len());

        for item in &new_items {
            self.notify(QueueEvent::ItemUpdated(item.clone()));
        }
        new_items
    }

    fn new_item(&self, url: &str) -> QueueItem {
        QueueItem {
            id: Uuid::new_v4().to_string(),
            source_url: url.to_string(),
            title: derive_title(url, &self.config),
            description: self.config.default_description.clone(),
            tags: self.config.default_tags.clone(),
            privacy_status: self.config.default_privacy,
            status: UploadStatus::Idle,
            progress: 0,
            error: None,
            remote_id: None,
            created_at: Utc::now(),
        }
    }

    /// Snapshot of one item.
    pub fn get(&self, id: &str) -> Option<QueueItem> {
        self.read().iter().find(|item| item.id == id).cloned()
    }

    /// Snapshot of all items in queue order.
    pub fn list(&self) -> Vec<QueueItem> {
        self.read().clone()
    }

    /// Identifiers in queue order.
    pub fn ids(&self) -> Vec<String> {
        self.read().iter().map(|item| item.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn counts(&self) -> QueueCounts {
        let items = self.read();
        let mut counts = QueueCounts {
            total: items.len(),
            ..Default::default()
        };
        for item in items.iter() {
            match item.status {
                UploadStatus::Idle => counts.idle += 1,
                UploadStatus::Fetching => counts.fetching += 1,
                UploadStatus::Uploading => counts.uploading += 1,
                UploadStatus::Completed => counts.completed += 1,
                UploadStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Merge user-editable fields into an item.
    ///
    /// Returns `Ok(None)` when no item has the given id.
    pub fn update(&self, id: &str, update: ItemUpdate) -> Result<Option<QueueItem>, QueueError> {
        let updated = {
            let mut items = self.write();
            let Some(item) = items.iter_mut().find(|item| item.id == id) else {
                debug!("Ignoring update for unknown item {}", id);
                return Ok(None);
            };
            if item.status.is_active() {
                return Err(QueueError::ItemBusy {
                    id: id.to_string(),
                    status: item.status,
                });
            }
            update.apply(item);
            item.clone()
        };

        self.notify(QueueEvent::ItemUpdated(updated.clone()));
        Ok(Some(updated))
    }

    /// Delete an item. Returns whether an item was removed.
    pub fn remove(&self, id: &str) -> Result<bool, QueueError> {
        if self.is_batch_active() {
            warn!("Refusing to remove item {} during a batch run", id);
            return Err(QueueError::BatchInProgress);
        }

        let removed = {
            let mut items = self.write();
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        };

        if removed {
            self.notify(QueueEvent::ItemRemoved { id: id.to_string() });
        }
        Ok(removed)
    }

    /// Empty the queue. Returns the number of items dropped.
    pub fn clear(&self) -> Result<usize, QueueError> {
        if self.is_batch_active() {
            warn!("Refusing to clear the queue during a batch run");
            return Err(QueueError::BatchInProgress);
        }

        let dropped = {
            let mut items = self.write();
            let n = items.len();
            items.clear();
            n
        };

        info!("Cleared {} item(s) from the queue", dropped);
        self.notify(QueueEvent::Cleared);
        Ok(dropped)
    }

    pub fn is_batch_active(&self) -> bool {
        self.batch_active.load(Ordering::SeqCst)
    }

    /// Mark a batch as running. Returns `None` if one already is.
    ///
    /// The flag is released when the returned guard is dropped.
    pub fn try_begin_batch(self: &Arc<Self>) -> Option<BatchGuard> {
        if self
            .batch_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        self.notify(QueueEvent::BatchActive(true));
        Some(BatchGuard {
            queue: Arc::clone(self),
        })
    }

    /// Apply a pipeline-owned mutation and broadcast the result.
    fn mutate_lifecycle<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut QueueItem) -> bool,
    {
        let changed = {
            let mut items = self.write();
            match items.iter_mut().find(|item| item.id == id) {
                Some(item) => f(item).then(|| item.clone()),
                None => None,
            }
        };

        match changed {
            Some(item) => {
                self.notify(QueueEvent::ItemUpdated(item));
                true
            }
            None => false,
        }
    }

    /// Enter `Fetching` or `Uploading`, resetting progress to 0.
    pub(crate) fn start_phase(&self, id: &str, phase: UploadStatus) -> bool {
        self.mutate_lifecycle(id, |item| {
            if !item.status.can_transition_to(phase) {
                warn!(
                    "Invalid transition for item {}: {} -> {}",
                    item.id, item.status, phase
                );
                return false;
            }
            item.status = phase;
            item.progress = 0;
            item.error = None;
            item.remote_id = None;
            true
        })
    }

    /// Record phase progress. Ignores values that would move progress backwards.
    pub(crate) fn set_progress(&self, id: &str, percent: u8) -> bool {
        let percent = percent.min(100);
        self.mutate_lifecycle(id, |item| {
            if !item.status.is_active() || percent <= item.progress {
                return false;
            }
            item.progress = percent;
            true
        })
    }

    pub(crate) fn mark_completed(&self, id: &str, remote_id: String) -> bool {
        self.mutate_lifecycle(id, |item| {
            if !item.status.can_transition_to(UploadStatus::Completed) {
                return false;
            }
            item.status = UploadStatus::Completed;
            item.progress = 100;
            item.error = None;
            item.remote_id = Some(remote_id);
            true
        })
    }

    pub(crate) fn mark_failed(&self, id: &str, error: String) -> bool {
        self.mutate_lifecycle(id, |item| {
            if !item.status.can_transition_to(UploadStatus::Failed) {
                return false;
            }
            item.status = UploadStatus::Failed;
            item.error = Some(error);
            item.remote_id = None;
            true
        })
    }
}

/// Holds the queue's batch flag; releases it on drop.
#[derive(Debug)]
pub struct BatchGuard {
    queue: Arc<UploadQueue>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.queue.batch_active.store(false, Ordering::SeqCst);
        self.queue.notify(QueueEvent::BatchActive(false));
    }
}

/// Title from the trailing path segment of a link, without its query string.
pub fn derive_title(url: &str, config: &QueueConfig) -> String {
    let segment = url
        .rsplit('/')
        .next()
        .and_then(|last| last.split('?').next())
        .unwrap_or_default();

    let base = if segment.is_empty() {
        config.placeholder_title.as_str()
    } else {
        segment
    };
    format!("{}{}", config.title_prefix, base)
}

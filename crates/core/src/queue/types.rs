//! Queue item data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a queued transfer.
///
/// `Idle -> Fetching -> Uploading -> Completed`, with `Fetching` and
/// `Uploading` able to fall to `Failed`. Only `Completed` is skipped by a
/// batch run; `Failed` items are picked up again from `Fetching`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Fetching,
    Uploading,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Fetching => "fetching",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        }
    }

    /// Whether a transfer is in flight for the item.
    pub fn is_active(&self) -> bool {
        matches!(self, UploadStatus::Fetching | UploadStatus::Uploading)
    }

    /// Whether the pipeline may move an item from `self` to `next`.
    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        use UploadStatus::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Failed, Fetching)
                | (Fetching, Uploading)
                | (Fetching, Failed)
                | (Uploading, Completed)
                | (Uploading, Failed)
        )
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may view the uploaded video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl PrivacyStatus {
    /// Value expected by the YouTube Data API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
        }
    }
}

/// One requested transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Opaque identifier assigned at enqueue time.
    pub id: String,
    /// Link the payload is fetched from.
    pub source_url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy_status: PrivacyStatus,
    pub status: UploadStatus,
    /// Progress of the current phase (0-100).
    pub progress: u8,
    /// Set only while `status` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Video ID assigned by the platform, set only once `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User-editable fields of a queue item.
///
/// Pipeline-owned fields (status, progress, error, remote id) are not part of
/// this type and can only be changed by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<PrivacyStatus>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.privacy_status.is_none()
    }

    pub(crate) fn apply(self, item: &mut QueueItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(tags) = self.tags {
            item.tags = tags;
        }
        if let Some(privacy) = self.privacy_status {
            item.privacy_status = privacy;
        }
    }
}

/// A change to the queue, delivered to the update callback.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// An item was added or any of its fields changed.
    ItemUpdated(QueueItem),
    /// An item was removed.
    ItemRemoved { id: String },
    /// The queue was emptied.
    Cleared,
    /// A batch run started or finished.
    BatchActive(bool),
}

/// Errors returned by queue mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Destructive mutations are refused while a batch is running.
    #[error("queue is locked while a batch is in progress")]
    BatchInProgress,

    /// The item is being fetched or uploaded.
    #[error("item {id} is busy ({status})")]
    ItemBusy { id: String, status: UploadStatus },
}

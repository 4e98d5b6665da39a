//! Upload queue: the list of requested transfers and their lifecycle state.
//!
//! Items are created from pasted text (one link per line), edited by the user
//! while idle, and driven through `fetching -> uploading -> completed` by the
//! orchestrator. Every change is reported through an optional update callback
//! so a presentation layer can re-render from the item records.

mod config;
mod store;
mod types;

pub use config::QueueConfig;
pub use store::{derive_title, BatchGuard, QueueCounts, QueueUpdateCallback, UploadQueue};
pub use types::{ItemUpdate, PrivacyStatus, QueueError, QueueEvent, QueueItem, UploadStatus};

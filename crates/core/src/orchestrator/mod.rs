//! Batch orchestrator: drives queued items through fetch and upload.
//!
//! A batch processes items one at a time in queue order:
//! - **Fetch**: download the payload from the item's link
//! - **Upload**: open a session and transmit the payload
//!
//! Per-item failures are recorded on the item and the batch moves on. A
//! missing credential stops the batch before any item is touched.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::BatchOrchestrator;
pub use types::{BatchSummary, OrchestratorError, OrchestratorStatus, PipelineError};

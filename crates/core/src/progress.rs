//! Progress reporting for long-running transfers.
//!
//! Fetchers and uploaders report whole percentages through a [`ProgressSink`]
//! without knowing anything about the queue that owns the item.

use std::sync::Arc;

/// Receives transfer progress as a whole percentage (0-100).
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Sink that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _percent: u8) {}
}

/// Shared handle to a progress sink.
pub type SharedProgress = Arc<dyn ProgressSink>;

/// Create a sink that discards all progress.
pub fn noop_progress() -> SharedProgress {
    Arc::new(NoopProgress)
}

/// `round(done / total * 100)`, clamped to 0-100.
///
/// Returns `None` when the total is unknown (zero).
pub fn percent_of(done: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = (done as f64 / total as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

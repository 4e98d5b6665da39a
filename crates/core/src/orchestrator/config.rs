//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Longest error message stored on a failed item (bytes).
    /// Longer messages are cut and suffixed with an ellipsis.
    #[serde(default = "default_max_error_len")]
    pub max_error_len: usize,
}

fn default_max_error_len() -> usize {
    2048
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_error_len: default_max_error_len(),
        }
    }
}

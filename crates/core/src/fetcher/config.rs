//! Configuration for the transfer fetcher.

use serde::{Deserialize, Serialize};

/// Configuration for downloading source payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout in seconds, body included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Drive v3 files endpoint used for rewritten share links.
    #[serde(default = "default_drive_files_endpoint")]
    pub drive_files_endpoint: String,

    /// Send the bearer credential with rewritten Drive requests.
    #[serde(default = "default_true")]
    pub authorize_drive_requests: bool,
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_drive_files_endpoint() -> String {
    "https://www.googleapis.com/drive/v3/files".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            drive_files_endpoint: default_drive_files_endpoint(),
            authorize_drive_requests: true,
        }
    }
}

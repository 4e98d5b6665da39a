//! Configuration for the upload submitter.

use serde::{Deserialize, Serialize};

/// Configuration for YouTube resumable uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Session initiation endpoint.
    #[serde(default = "default_initiate_url")]
    pub initiate_url: String,

    /// Video category sent with every upload.
    #[serde(default = "default_category_id")]
    pub category_id: String,

    /// Content type used when the source did not declare one.
    #[serde(default = "default_content_type")]
    pub default_content_type: String,

    /// Body chunk size for the bulk transfer; sets progress granularity.
    #[serde(default = "default_transfer_chunk_bytes")]
    pub transfer_chunk_bytes: usize,

    /// Provider response body kept in transfer errors.
    #[serde(default = "default_max_error_body_bytes")]
    pub max_error_body_bytes: usize,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_initiate_url() -> String {
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status"
        .to_string()
}

fn default_category_id() -> String {
    // People & Blogs
    "22".to_string()
}

fn default_content_type() -> String {
    "video/*".to_string()
}

fn default_transfer_chunk_bytes() -> usize {
    256 * 1024
}

fn default_max_error_body_bytes() -> usize {
    1024
}

fn default_timeout_secs() -> u64 {
    3600
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            initiate_url: default_initiate_url(),
            category_id: default_category_id(),
            default_content_type: default_content_type(),
            transfer_chunk_bytes: default_transfer_chunk_bytes(),
            max_error_body_bytes: default_max_error_body_bytes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

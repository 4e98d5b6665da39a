//! Request and response bodies for the YouTube upload protocol.

use serde::{Deserialize, Serialize};

use crate::queue::{PrivacyStatus, QueueItem};

/// Descriptive attributes of the video being uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy_status: PrivacyStatus,
}

impl From<&QueueItem> for VideoMetadata {
    fn from(item: &QueueItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            tags: item.tags.clone(),
            privacy_status: item.privacy_status,
        }
    }
}

/// Body of the session initiation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateUploadBody {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: PrivacyStatus,
    pub self_declared_made_for_kids: bool,
}

impl InitiateUploadBody {
    pub fn new(metadata: &VideoMetadata, category_id: &str) -> Self {
        Self {
            snippet: VideoSnippet {
                title: metadata.title.clone(),
                description: metadata.description.clone(),
                tags: metadata.tags.clone(),
                category_id: category_id.to_string(),
            },
            status: VideoStatus {
                privacy_status: metadata.privacy_status,
                self_declared_made_for_kids: false,
            },
        }
    }
}

/// Resource returned once the transfer completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedVideo {
    pub id: String,
}

/// Google API error envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}

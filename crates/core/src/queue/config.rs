//! Defaults applied to newly enqueued items.

use serde::{Deserialize, Serialize};

use super::types::PrivacyStatus;

/// Configuration for new queue items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Description given to every new item.
    #[serde(default = "default_description")]
    pub default_description: String,

    /// Tags given to every new item.
    #[serde(default = "default_tags")]
    pub default_tags: Vec<String>,

    /// Visibility given to every new item.
    #[serde(default)]
    pub default_privacy: PrivacyStatus,

    /// Prepended to the title derived from the link.
    #[serde(default)]
    pub title_prefix: String,

    /// Title used when the link has no usable trailing path segment.
    #[serde(default = "default_placeholder_title")]
    pub placeholder_title: String,
}

fn default_description() -> String {
    "Uploaded via TubeStream Automator".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["automation".to_string(), "tubestream".to_string()]
}

fn default_placeholder_title() -> String {
    "New Video".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_description: default_description(),
            default_tags: default_tags(),
            default_privacy: PrivacyStatus::default(),
            title_prefix: String::new(),
            placeholder_title: default_placeholder_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.default_description, "Uploaded via TubeStream Automator");
        assert_eq!(config.default_tags, vec!["automation", "tubestream"]);
        assert_eq!(config.default_privacy, PrivacyStatus::Private);
        assert!(config.title_prefix.is_empty());
        assert_eq!(config.placeholder_title, "New Video");
    }
}

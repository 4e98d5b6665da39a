//! Types produced by the fetcher.

use bytes::Bytes;

/// A downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    pub bytes: Bytes,
    /// `Content-Type` declared by the source, if any.
    pub content_type: Option<String>,
}

impl FetchedPayload {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where a source reference is actually fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub url: String,
    /// Set when a Drive share link was rewritten.
    pub drive_file_id: Option<String>,
}

impl ResolvedSource {
    pub fn is_drive(&self) -> bool {
        self.drive_file_id.is_some()
    }
}

//! Share-link resolution.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::ResolvedSource;

const DRIVE_HOST: &str = "drive.google.com";

static DRIVE_PATH_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/file/d/([^/?#]+)").ok());
static QUERY_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[?&]id=([^&#]+)").ok());

/// Extract the file identifier from a Drive share link.
///
/// The path form `.../file/d/<id>/...` is only honored when the link names
/// the Drive host. The query form `?id=<id>` is honored on any host, so an
/// unrelated URL carrying an `id` parameter is rewritten to the Drive
/// endpoint as well.
pub fn drive_file_id(source: &str) -> Option<String> {
    if source.contains(DRIVE_HOST) {
        if let Some(id) = capture(&DRIVE_PATH_ID, source) {
            return Some(id);
        }
    }
    capture(&QUERY_ID, source)
}

fn capture(regex: &Lazy<Option<Regex>>, source: &str) -> Option<String> {
    regex
        .as_ref()?
        .captures(source)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Rewrite Drive share links to the direct-media endpoint; pass the rest through.
pub fn resolve_source(source: &str, drive_files_endpoint: &str) -> ResolvedSource {
    match drive_file_id(source) {
        Some(id) => ResolvedSource {
            url: format!(
                "{}/{}?alt=media",
                drive_files_endpoint.trim_end_matches('/'),
                urlencoding::encode(&id)
            ),
            drive_file_id: Some(id),
        },
        None => ResolvedSource {
            url: source.to_string(),
            drive_file_id: None,
        },
    }
}

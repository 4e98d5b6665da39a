//! YouTube Data API resumable uploader.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Client};
use tracing::{debug, info, warn};

use super::config::UploaderConfig;
use super::error::{truncate_with_ellipsis, UploadError};
use super::traits::Uploader;
use super::types::{ApiErrorBody, InitiateUploadBody, UploadedVideo, VideoMetadata};
use crate::auth::Credential;
use crate::fetcher::FetchedPayload;
use crate::metrics::{result_label, BYTES_UPLOADED, EXTERNAL_SERVICE_REQUESTS, UPLOAD_DURATION};
use crate::progress::{percent_of, SharedProgress};

const UPLOAD_CONTENT_LENGTH: &str = "X-Upload-Content-Length";
const UPLOAD_CONTENT_TYPE: &str = "X-Upload-Content-Type";
const INITIATE_FALLBACK_MESSAGE: &str = "Failed to initiate upload session";

/// Uploader speaking the YouTube resumable upload protocol.
pub struct YouTubeUploader {
    client: Client,
    config: UploaderConfig,
}

impl YouTubeUploader {
    pub fn new(config: UploaderConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploadError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Open an upload session and return its URL.
    async fn initiate_session(
        &self,
        payload: &FetchedPayload,
        content_type: &str,
        metadata: &VideoMetadata,
        credential: &Credential,
    ) -> Result<String, UploadError> {
        let body = InitiateUploadBody::new(metadata, &self.config.category_id);

        let response = self
            .client
            .post(&self.config.initiate_url)
            .bearer_auth(&credential.access_token)
            .header(CONTENT_TYPE, "application/json")
            .header(UPLOAD_CONTENT_LENGTH, payload.len().to_string())
            .header(UPLOAD_CONTENT_TYPE, content_type)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["youtube", "network_error"])
                    .inc();
                UploadError::Network(e.to_string())
            })?;

        let status = response.status();
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["youtube", result_label(status.is_success())])
            .inc();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.message().map(|m| m.to_string()))
                .unwrap_or_else(|| INITIATE_FALLBACK_MESSAGE.to_string());
            warn!("Upload session initiation rejected ({}): {}", status, message);
            return Err(UploadError::SessionInitiation {
                status: status.as_u16(),
                message,
            });
        }

        let session_url = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .ok_or(UploadError::MissingSessionUrl)?;

        debug!("Upload session opened at {}", session_url);
        Ok(session_url)
    }

    /// Send the whole payload to the session URL in one request.
    async fn transfer(
        &self,
        session_url: &str,
        payload: &FetchedPayload,
        content_type: &str,
        credential: &Credential,
        progress: SharedProgress,
    ) -> Result<String, UploadError> {
        let total = payload.len() as u64;
        let chunks = split_chunks(&payload.bytes, self.config.transfer_chunk_bytes);

        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(percent) = percent_of(sent, total) {
                progress.report(percent);
            }
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let response = self
            .client
            .put(session_url)
            .bearer_auth(&credential.access_token)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["youtube", "network_error"])
                    .inc();
                UploadError::Network(e.to_string())
            })?;

        let status = response.status();
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["youtube", result_label(status.is_success())])
            .inc();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(UploadError::Transfer {
                status: status.as_u16(),
                body: truncate_with_ellipsis(&text, self.config.max_error_body_bytes),
            });
        }

        BYTES_UPLOADED.inc_by(total);
        let video: UploadedVideo = serde_json::from_str(&text).map_err(|e| {
            UploadError::InvalidResponse(format!(
                "{}: {}",
                e,
                truncate_with_ellipsis(&text, self.config.max_error_body_bytes)
            ))
        })?;
        Ok(video.id)
    }
}

/// Split `bytes` into views of at most `chunk_size` bytes.
fn split_chunks(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..bytes.len())
        .step_by(chunk_size)
        .map(|start| bytes.slice(start..(start + chunk_size).min(bytes.len())))
        .collect()
}

#[async_trait]
impl Uploader for YouTubeUploader {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn submit(
        &self,
        payload: &FetchedPayload,
        metadata: &VideoMetadata,
        credential: &Credential,
        progress: SharedProgress,
    ) -> Result<String, UploadError> {
        let started = Instant::now();
        let content_type = payload
            .content_type
            .as_deref()
            .unwrap_or(&self.config.default_content_type)
            .to_string();

        let result = async {
            let session_url = self
                .initiate_session(payload, &content_type, metadata, credential)
                .await?;
            self.transfer(&session_url, payload, &content_type, credential, progress)
                .await
        }
        .await;

        UPLOAD_DURATION
            .with_label_values(&[result_label(result.is_ok())])
            .observe(started.elapsed().as_secs_f64());

        if let Ok(ref video_id) = result {
            info!(
                "Uploaded '{}' ({} bytes) as video {}",
                metadata.title,
                payload.len(),
                video_id
            );
        }
        result
    }
}

//! HTTP fetcher backed by reqwest.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::link::resolve_source;
use super::traits::Fetcher;
use super::types::FetchedPayload;
use crate::auth::Credential;
use crate::metrics::{result_label, BYTES_FETCHED, EXTERNAL_SERVICE_REQUESTS, FETCH_DURATION};
use crate::progress::{percent_of, SharedProgress};

/// Largest buffer reserved up front from a declared length.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Fetcher that downloads over plain HTTP(S) GET.
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn download(
        &self,
        source: &str,
        credential: Option<&Credential>,
        progress: SharedProgress,
    ) -> Result<FetchedPayload, FetchError> {
        let resolved = resolve_source(source, &self.config.drive_files_endpoint);
        let service = if resolved.is_drive() { "drive" } else { "source" };
        if resolved.is_drive() {
            debug!("Rewrote Drive link {} -> {}", source, resolved.url);
        }

        let mut request = self.client.get(&resolved.url);
        if resolved.is_drive() && self.config.authorize_drive_requests {
            if let Some(credential) = credential {
                request = request.bearer_auth(&credential.access_token);
            }
        }

        let response = request.send().await.map_err(|e| {
            EXTERNAL_SERVICE_REQUESTS
                .with_label_values(&[service, "network_error"])
                .inc();
            FetchError::Network(e.to_string())
        })?;

        let status = response.status();
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[service, result_label(status.is_success())])
            .inc();
        if !status.is_success() {
            warn!("Fetch of {} returned {}", resolved.url, status);
            return Err(FetchError::from_status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = match response.content_length().filter(|len| *len > 0) {
            Some(total) => read_with_progress(response, total, &progress).await?,
            None => {
                debug!("No declared length for {}, reading without progress", resolved.url);
                response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::Body(e.to_string()))?
            }
        };

        Ok(FetchedPayload::new(bytes, content_type))
    }
}

/// Consume the body chunk by chunk, reporting percent of `total` after each.
async fn read_with_progress(
    response: Response,
    total: u64,
    progress: &SharedProgress,
) -> Result<Bytes, FetchError> {
    let mut buffer = BytesMut::with_capacity(total.min(MAX_PREALLOCATION) as usize);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::Body(e.to_string()))?;
        buffer.extend_from_slice(&chunk);
        if let Some(percent) = percent_of(buffer.len() as u64, total) {
            progress.report(percent);
        }
    }

    Ok(buffer.freeze())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(
        &self,
        source: &str,
        credential: Option<&Credential>,
        progress: SharedProgress,
    ) -> Result<FetchedPayload, FetchError> {
        let started = Instant::now();
        let result = self.download(source, credential, progress).await;

        FETCH_DURATION
            .with_label_values(&[result_label(result.is_ok())])
            .observe(started.elapsed().as_secs_f64());

        if let Ok(ref payload) = result {
            BYTES_FETCHED.inc_by(payload.len() as u64);
            info!(
                "Fetched {} bytes from {} in {:.1}s",
                payload.len(),
                source,
                started.elapsed().as_secs_f64()
            );
        }
        result
    }
}

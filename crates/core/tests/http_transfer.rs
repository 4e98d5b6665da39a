//! HTTP transfer tests.
//!
//! Runs the real fetcher, uploader and consent supplier against an in-process
//! axum server standing in for the source host, Drive, YouTube and the OAuth
//! revoke endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Form, Json, Router,
};
use tubestream_core::{
    testing::fixtures, uploader::InitiateUploadBody, AuthConfig, ConsentResponse,
    CredentialSupplier, FetchError, FetchedPayload, Fetcher, FetcherConfig, HttpFetcher,
    OAuthConsentSupplier, PrivacyStatus, UploadError, Uploader, UploaderConfig, VideoMetadata,
    YouTubeUploader,
};

const SIZED_LEN: usize = 100_000;
const UPLOAD_LEN: usize = 600_000;

#[derive(Debug, Clone)]
struct InitRecord {
    authorization: Option<String>,
    upload_length: Option<String>,
    upload_type: Option<String>,
    body: InitiateUploadBody,
}

#[derive(Debug, Clone)]
struct PutRecord {
    authorization: Option<String>,
    content_type: Option<String>,
    len: usize,
}

#[derive(Clone, Default)]
struct Recorder {
    base: String,
    inits: Arc<Mutex<Vec<InitRecord>>>,
    puts: Arc<Mutex<Vec<PutRecord>>>,
    revoked: Arc<Mutex<Vec<String>>>,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn sized_file() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "video/mp4")],
        Bytes::from(vec![7u8; SIZED_LEN]),
    )
}

async fn unsized_file() -> impl IntoResponse {
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"abc")),
        Ok(Bytes::from_static(b"def")),
    ];
    Body::from_stream(futures::stream::iter(chunks))
}

async fn drive_file(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> String {
    format!(
        "{}|{}|{}",
        id,
        params.get("alt").cloned().unwrap_or_default(),
        header_str(&headers, "authorization").unwrap_or_default()
    )
}

async fn init_session(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<InitiateUploadBody>,
) -> impl IntoResponse {
    recorder.inits.lock().unwrap().push(InitRecord {
        authorization: header_str(&headers, "authorization"),
        upload_length: header_str(&headers, "x-upload-content-length"),
        upload_type: header_str(&headers, "x-upload-content-type"),
        body,
    });
    (
        StatusCode::OK,
        [(header::LOCATION, format!("{}/upload/session/ok", recorder.base))],
    )
}

async fn init_session_failing_transfer(State(recorder): State<Recorder>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::LOCATION, format!("{}/upload/session/fail", recorder.base))],
    )
}

async fn init_without_location() -> StatusCode {
    StatusCode::OK
}

async fn init_rejected() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": {"code": 401, "message": "Invalid Credentials"}})),
    )
}

async fn init_rejected_without_message() -> StatusCode {
    StatusCode::FORBIDDEN
}

async fn transfer_ok(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    recorder.puts.lock().unwrap().push(PutRecord {
        authorization: header_str(&headers, "authorization"),
        content_type: header_str(&headers, "content-type"),
        len: body.len(),
    });
    Json(serde_json::json!({"id": format!("vid-{}", body.len()), "kind": "youtube#video"}))
}

async fn transfer_fail(body: Bytes) -> impl IntoResponse {
    let _ = body;
    (StatusCode::FORBIDDEN, "x".repeat(5000))
}

async fn revoke(State(recorder): State<Recorder>, Form(form): Form<HashMap<String, String>>) {
    if let Some(token) = form.get("token") {
        recorder.revoked.lock().unwrap().push(token.clone());
    }
}

async fn start_server() -> Recorder {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let recorder = Recorder {
        base: format!("http://{}", listener.local_addr().unwrap()),
        ..Default::default()
    };

    let app = Router::new()
        .route("/files/sized.mp4", get(sized_file))
        .route("/files/unsized.mp4", get(unsized_file))
        .route("/files/missing.mp4", get(|| async { StatusCode::NOT_FOUND }))
        .route("/drive/v3/files/{id}", get(drive_file))
        .route("/upload/init", post(init_session))
        .route("/upload/init-fail-transfer", post(init_session_failing_transfer))
        .route("/upload/init-no-location", post(init_without_location))
        .route("/upload/init-rejected", post(init_rejected))
        .route("/upload/init-forbidden", post(init_rejected_without_message))
        .route("/upload/session/ok", put(transfer_ok))
        .route("/upload/session/fail", put(transfer_fail))
        .route("/revoke", post(revoke))
        .with_state(recorder.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    recorder
}

fn recording_sink() -> (Arc<Mutex<Vec<u8>>>, tubestream_core::SharedProgress) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, Arc::new(move |p: u8| sink.lock().unwrap().push(p)))
}

fn fetcher(recorder: &Recorder) -> HttpFetcher {
    HttpFetcher::new(FetcherConfig {
        timeout_secs: 10,
        drive_files_endpoint: format!("{}/drive/v3/files", recorder.base),
        authorize_drive_requests: true,
    })
    .unwrap()
}

fn uploader(recorder: &Recorder, init_path: &str) -> YouTubeUploader {
    YouTubeUploader::new(UploaderConfig {
        initiate_url: format!("{}{}", recorder.base, init_path),
        timeout_secs: 10,
        ..Default::default()
    })
    .unwrap()
}

fn metadata() -> VideoMetadata {
    VideoMetadata {
        title: "a.mp4".to_string(),
        description: "Uploaded via TubeStream Automator".to_string(),
        tags: vec!["automation".to_string(), "tubestream".to_string()],
        privacy_status: PrivacyStatus::Private,
    }
}

fn assert_monotonic_to_100(progress: &[u8]) {
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{:?}", progress);
    assert_eq!(*progress.last().unwrap(), 100);
}

// =============================================================================
// Fetcher
// =============================================================================

#[tokio::test]
async fn test_fetch_reports_progress_to_100() {
    let recorder = start_server().await;
    let (seen, sink) = recording_sink();

    let payload = fetcher(&recorder)
        .fetch(&format!("{}/files/sized.mp4", recorder.base), None, sink)
        .await
        .unwrap();

    assert_eq!(payload.len(), SIZED_LEN);
    assert_eq!(payload.content_type.as_deref(), Some("video/mp4"));
    assert_monotonic_to_100(&seen.lock().unwrap());
}

#[tokio::test]
async fn test_fetch_without_length_skips_progress() {
    let recorder = start_server().await;
    let (seen, sink) = recording_sink();

    let payload = fetcher(&recorder)
        .fetch(&format!("{}/files/unsized.mp4", recorder.base), None, sink)
        .await
        .unwrap();

    assert_eq!(&payload.bytes[..], b"abcdef");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_not_found_carries_status_text() {
    let recorder = start_server().await;
    let (seen, sink) = recording_sink();

    let err = fetcher(&recorder)
        .fetch(&format!("{}/files/missing.mp4", recorder.base), None, sink)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "Failed to fetch file: Not Found");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_drive_link_rewritten_with_bearer() {
    let recorder = start_server().await;
    let credential = fixtures::credential();

    let payload = fetcher(&recorder)
        .fetch(
            "https://drive.google.com/file/d/XYZ/view?usp=sharing",
            Some(&credential),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap();

    assert_eq!(&payload.bytes[..], b"XYZ|media|Bearer ya29.mock-token");
}

#[tokio::test]
async fn test_non_drive_fetch_never_sends_credential() {
    let recorder = start_server().await;
    let credential = fixtures::credential();

    // The drive handler echoes the authorization header; hit it by plain URL
    let payload = fetcher(&recorder)
        .fetch(
            &format!("{}/drive/v3/files/plain", recorder.base),
            Some(&credential),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap();

    assert_eq!(&payload.bytes[..], b"plain||");
}

// =============================================================================
// Uploader
// =============================================================================

#[tokio::test]
async fn test_upload_success_returns_video_id() {
    let recorder = start_server().await;
    let (seen, sink) = recording_sink();
    let payload = FetchedPayload::new(vec![1u8; UPLOAD_LEN], Some("video/mp4".to_string()));

    let video_id = uploader(&recorder, "/upload/init")
        .submit(&payload, &metadata(), &fixtures::credential(), sink)
        .await
        .unwrap();

    assert_eq!(video_id, format!("vid-{}", UPLOAD_LEN));

    let inits = recorder.inits.lock().unwrap().clone();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].authorization.as_deref(), Some("Bearer ya29.mock-token"));
    assert_eq!(inits[0].upload_length, Some(UPLOAD_LEN.to_string()));
    assert_eq!(inits[0].upload_type.as_deref(), Some("video/mp4"));
    assert_eq!(inits[0].body.snippet.title, "a.mp4");
    assert_eq!(inits[0].body.snippet.category_id, "22");
    assert_eq!(inits[0].body.status.privacy_status, PrivacyStatus::Private);
    assert!(!inits[0].body.status.self_declared_made_for_kids);

    let puts = recorder.puts.lock().unwrap().clone();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].len, UPLOAD_LEN);
    assert_eq!(puts[0].content_type.as_deref(), Some("video/mp4"));
    assert_eq!(puts[0].authorization.as_deref(), Some("Bearer ya29.mock-token"));

    let progress = seen.lock().unwrap().clone();
    assert_monotonic_to_100(&progress);
    // 600 000 bytes in 256 KiB chunks
    assert_eq!(progress, vec![44, 87, 100]);
}

#[tokio::test]
async fn test_upload_defaults_content_type() {
    let recorder = start_server().await;
    let payload = FetchedPayload::new(vec![1u8; 10], None);

    uploader(&recorder, "/upload/init")
        .submit(
            &payload,
            &metadata(),
            &fixtures::credential(),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap();

    assert_eq!(
        recorder.inits.lock().unwrap()[0].upload_type.as_deref(),
        Some("video/*")
    );
    assert_eq!(
        recorder.puts.lock().unwrap()[0].content_type.as_deref(),
        Some("video/*")
    );
}

#[tokio::test]
async fn test_missing_location_is_session_error() {
    let recorder = start_server().await;
    let (seen, sink) = recording_sink();

    let err = uploader(&recorder, "/upload/init-no-location")
        .submit(&fixtures::payload(100), &metadata(), &fixtures::credential(), sink)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::MissingSessionUrl));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_initiation_uses_provider_message() {
    let recorder = start_server().await;

    let err = uploader(&recorder, "/upload/init-rejected")
        .submit(
            &fixtures::payload(100),
            &metadata(),
            &fixtures::credential(),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::SessionInitiation { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid Credentials");
}

#[tokio::test]
async fn test_rejected_initiation_falls_back_to_generic_message() {
    let recorder = start_server().await;

    let err = uploader(&recorder, "/upload/init-forbidden")
        .submit(
            &fixtures::payload(100),
            &metadata(),
            &fixtures::credential(),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to initiate upload session");
}

#[tokio::test]
async fn test_transfer_failure_body_is_bounded() {
    let recorder = start_server().await;

    let err = uploader(&recorder, "/upload/init-fail-transfer")
        .submit(
            &fixtures::payload(100),
            &metadata(),
            &fixtures::credential(),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap_err();

    match err {
        UploadError::Transfer { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, format!("{}…", "x".repeat(1024)));
        }
        other => panic!("expected Transfer error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_session_is_network_error() {
    // Nothing listens on port 9 of localhost
    let uploader = YouTubeUploader::new(UploaderConfig {
        initiate_url: "http://127.0.0.1:9/upload".to_string(),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap();

    let err = uploader
        .submit(
            &fixtures::payload(100),
            &metadata(),
            &fixtures::credential(),
            tubestream_core::noop_progress(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Network(_)));
}

// =============================================================================
// Consent supplier
// =============================================================================

#[tokio::test]
async fn test_revoke_posts_token_and_clears_credential() {
    let recorder = start_server().await;
    let supplier = OAuthConsentSupplier::new(AuthConfig {
        client_id: "1234.apps.googleusercontent.com".to_string(),
        revoke_endpoint: format!("{}/revoke", recorder.base),
        ..Default::default()
    })
    .unwrap();

    supplier.ensure_ready().await.unwrap();
    let request = supplier.request_credential().await.unwrap();
    supplier
        .complete_consent(ConsentResponse {
            access_token: Some("ya29.to-revoke".to_string()),
            expires_in: Some(3600),
            state: Some(request.state),
            ..Default::default()
        })
        .await
        .unwrap();

    supplier.revoke().await.unwrap();

    assert!(supplier.current().is_none());
    assert_eq!(
        recorder.revoked.lock().unwrap().clone(),
        vec!["ya29.to-revoke".to_string()]
    );
}

//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock transfer and credential components injected, so the whole API
//! can be exercised without reaching any remote host.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tubestream_core::{
    testing::{MockCredentialSupplier, MockFetcher, MockUploader},
    BatchOrchestrator, Config, OrchestratorConfig, ServerConfig, UploadQueue,
};
use tubestream_server::api::WsBroadcaster;
use tubestream_server::state::AppState;

/// Re-export fixtures for test convenience
pub use tubestream_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_enqueue() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/queue", json!({
///         "links": "https://videos.test/a.mp4"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock fetcher - configure payloads and failures
    pub fetcher: Arc<MockFetcher>,
    /// Mock uploader - inspect submissions
    pub uploader: Arc<MockUploader>,
    /// Mock credential supplier - control consent
    pub credentials: Arc<MockCredentialSupplier>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture holding a valid credential.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let fetcher = Arc::new(MockFetcher::new());
        let uploader = Arc::new(MockUploader::new());
        let credentials = Arc::new(if test_config.unauthenticated {
            MockCredentialSupplier::new()
        } else {
            MockCredentialSupplier::authenticated()
        });

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            ..Default::default()
        };

        let ws_broadcaster = WsBroadcaster::default();
        let queue = Arc::new(
            UploadQueue::new(config.queue.clone())
                .with_update_callback(ws_broadcaster.queue_callback()),
        );

        let orchestrator = Arc::new(BatchOrchestrator::new(
            OrchestratorConfig::default(),
            queue,
            Arc::clone(&fetcher) as Arc<dyn tubestream_core::Fetcher>,
            Arc::clone(&uploader) as Arc<dyn tubestream_core::Uploader>,
            Arc::clone(&credentials) as Arc<dyn tubestream_core::CredentialSupplier>,
        ));

        let state = Arc::new(AppState::new(config, orchestrator, ws_broadcaster));
        let router = tubestream_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            fetcher,
            uploader,
            credentials,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Enqueue links and return the new item IDs.
    pub async fn enqueue(&self, links: &str) -> Vec<String> {
        let response = self
            .post("/api/v1/queue", serde_json::json!({ "links": links }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["items"]
            .as_array()
            .expect("items array")
            .iter()
            .map(|item| item["id"].as_str().expect("item id").to_string())
            .collect()
    }

    /// Wait until no batch is running.
    pub async fn wait_for_batch(&self) {
        for _ in 0..200 {
            if !self.state.orchestrator().is_running() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("batch did not finish in time");
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Start without any upload credential
    pub unauthenticated: bool,
}

impl TestConfig {
    /// Create config whose credential supplier holds no credential.
    pub fn unauthenticated() -> Self {
        Self {
            unauthenticated: true,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

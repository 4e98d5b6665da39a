pub mod auth;
pub mod config;
pub mod fetcher;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod queue;
pub mod testing;
pub mod uploader;

pub use auth::{
    create_credential_supplier, AuthError, ConsentRequest, ConsentResponse, Credential,
    CredentialStatus, CredentialSupplier, OAuthConsentSupplier, StaticTokenSupplier,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, SanitizedConfig, ServerConfig,
};
pub use fetcher::{FetchError, FetchedPayload, Fetcher, FetcherConfig, HttpFetcher};
pub use orchestrator::{
    BatchOrchestrator, BatchSummary, OrchestratorConfig, OrchestratorError, OrchestratorStatus,
    PipelineError,
};
pub use progress::{noop_progress, ProgressSink, SharedProgress};
pub use queue::{
    ItemUpdate, PrivacyStatus, QueueConfig, QueueCounts, QueueError, QueueEvent, QueueItem,
    UploadQueue, UploadStatus,
};
pub use uploader::{UploadError, Uploader, UploaderConfig, VideoMetadata, YouTubeUploader};

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::fetcher::FetcherConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::queue::QueueConfig;
use crate::uploader::UploaderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub uploader: UploaderConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// How the bearer credential for the video platform is obtained.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Interactive OAuth consent (implicit grant, token delivered to a callback).
    #[default]
    OauthConsent,
    /// Pre-issued access token from configuration.
    StaticToken,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::OauthConsent => "oauth_consent",
            AuthMethod::StaticToken => "static_token",
        }
    }
}

/// Credential acquisition configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,
    /// OAuth client ID issued by the Google Cloud console.
    #[serde(default)]
    pub client_id: String,
    /// Scopes requested during consent.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_authorization_endpoint")]
    pub authorization_endpoint: String,
    #[serde(default = "default_revoke_endpoint")]
    pub revoke_endpoint: String,
    /// Where the consent page delivers the token.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Token used by the `static_token` method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Assumed token lifetime when the provider does not state one.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            method: AuthMethod::default(),
            client_id: String::new(),
            scopes: default_scopes(),
            authorization_endpoint: default_authorization_endpoint(),
            revoke_endpoint: default_revoke_endpoint(),
            redirect_uri: default_redirect_uri(),
            access_token: None,
            token_lifetime_secs: default_token_lifetime(),
        }
    }
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/youtube.upload".to_string(),
        "https://www.googleapis.com/auth/drive.readonly".to_string(),
    ]
}

fn default_authorization_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_revoke_endpoint() -> String {
    "https://oauth2.googleapis.com/revoke".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/auth/callback".to_string()
}

fn default_token_lifetime() -> u64 {
    3600
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub auth: SanitizedAuthConfig,
    pub fetcher: FetcherConfig,
    pub uploader: UploaderConfig,
    pub queue: QueueConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Auth config with the access token hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub access_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            auth: SanitizedAuthConfig {
                method: config.auth.method.as_str().to_string(),
                client_id: config.auth.client_id.clone(),
                scopes: config.auth.scopes.clone(),
                redirect_uri: config.auth.redirect_uri.clone(),
                access_token_configured: config
                    .auth
                    .access_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
            },
            fetcher: config.fetcher.clone(),
            uploader: config.uploader.clone(),
            queue: config.queue.clone(),
            orchestrator: config.orchestrator.clone(),
        }
    }
}

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use super::types::{ConsentRequest, ConsentResponse, Credential, CredentialStatus};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential supplier is not initialized")]
    NotReady,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Consent was not granted: {0}")]
    ConsentDenied(String),

    #[error("Consent response state does not match the pending request")]
    StateMismatch,

    #[error("Failed to revoke credential: {0}")]
    RevokeFailed(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source of the bearer credential used for uploads.
///
/// The batch runner only asks for the current credential; when there is none
/// it obtains a [`ConsentRequest`] to hand to the user and stops. Completion
/// arrives later through [`CredentialSupplier::complete_consent`] and is
/// observable through [`CredentialSupplier::subscribe`].
#[async_trait]
pub trait CredentialSupplier: Send + Sync {
    /// Name of this acquisition method
    fn method_name(&self) -> &'static str;

    /// Initialize the supplier. Safe to call repeatedly.
    async fn ensure_ready(&self) -> Result<(), AuthError>;

    /// Start a consent flow and return where the user must go.
    async fn request_credential(&self) -> Result<ConsentRequest, AuthError>;

    /// Finish a consent flow started by [`CredentialSupplier::request_credential`].
    async fn complete_consent(&self, response: ConsentResponse) -> Result<Credential, AuthError>;

    /// The held credential, if it is still valid.
    fn current(&self) -> Option<Credential>;

    /// Invalidate and forget the held credential.
    async fn revoke(&self) -> Result<(), AuthError>;

    /// Watch credential changes.
    fn subscribe(&self) -> watch::Receiver<Option<Credential>>;

    fn status(&self) -> CredentialStatus {
        let current = self.current();
        CredentialStatus {
            method: self.method_name().to_string(),
            authenticated: current.is_some(),
            expires_at: current.map(|c| c.expires_at),
        }
    }
}

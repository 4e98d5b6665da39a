use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use super::{AuthError, ConsentRequest, ConsentResponse, Credential, CredentialSupplier};

/// Supplier holding a pre-issued access token.
///
/// For headless runs where consent was obtained out of band. Cannot start a
/// consent flow; once the token expires or is revoked a new one must be
/// configured.
pub struct StaticTokenSupplier {
    credential: watch::Sender<Option<Credential>>,
}

impl StaticTokenSupplier {
    pub fn new(access_token: String, lifetime: chrono::Duration) -> Self {
        let credential = Some(access_token)
            .filter(|t| !t.is_empty())
            .map(|t| Credential::new(t, lifetime));
        let (credential, _) = watch::channel(credential);
        Self { credential }
    }
}

#[async_trait]
impl CredentialSupplier for StaticTokenSupplier {
    fn method_name(&self) -> &'static str {
        "static_token"
    }

    async fn ensure_ready(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn request_credential(&self) -> Result<ConsentRequest, AuthError> {
        Err(AuthError::Configuration(
            "static token is missing or expired; set a new auth.access_token".to_string(),
        ))
    }

    async fn complete_consent(&self, _response: ConsentResponse) -> Result<Credential, AuthError> {
        Err(AuthError::Configuration(
            "static_token does not accept consent responses".to_string(),
        ))
    }

    fn current(&self) -> Option<Credential> {
        self.credential
            .borrow()
            .as_ref()
            .filter(|c| c.is_valid())
            .cloned()
    }

    async fn revoke(&self) -> Result<(), AuthError> {
        if self.credential.send_replace(None).is_some() {
            info!("Static credential discarded");
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credential.subscribe()
    }
}

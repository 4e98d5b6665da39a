//! OAuth implicit-grant consent flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    lifetime_from_secs, AuthError, ConsentRequest, ConsentResponse, Credential,
    CredentialSupplier,
};
use crate::config::AuthConfig;

const CLIENT_ID_PLACEHOLDER: &str = "YOUR_CLIENT_ID";

/// Supplier that sends the user through the provider's consent page.
///
/// The access token comes back on the redirect URI and is handed in through
/// [`CredentialSupplier::complete_consent`]. Each new token replaces the
/// previous one on a watch channel.
pub struct OAuthConsentSupplier {
    client: Client,
    config: AuthConfig,
    ready: AtomicBool,
    /// State nonce of the outstanding consent request.
    pending_state: Mutex<Option<String>>,
    credential: watch::Sender<Option<Credential>>,
}

impl OAuthConsentSupplier {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let (credential, _) = watch::channel(None);

        Ok(Self {
            client,
            config,
            ready: AtomicBool::new(false),
            pending_state: Mutex::new(None),
            credential,
        })
    }

    fn check_client_id(&self) -> Result<(), AuthError> {
        let client_id = self.config.client_id.trim();
        if client_id.is_empty() || client_id.starts_with(CLIENT_ID_PLACEHOLDER) {
            return Err(AuthError::Configuration(
                "auth.client_id is not configured; create an OAuth client ID and set it".to_string(),
            ));
        }
        Ok(())
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope = self.config.scopes.join(" ");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "token"),
            ("scope", scope.as_str()),
            ("prompt", "consent"),
            ("state", state),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_endpoint, query)
    }

    fn take_pending_state(&self) -> Option<String> {
        self.pending_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl CredentialSupplier for OAuthConsentSupplier {
    fn method_name(&self) -> &'static str {
        "oauth_consent"
    }

    async fn ensure_ready(&self) -> Result<(), AuthError> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.check_client_id()?;
        if !self.ready.swap(true, Ordering::SeqCst) {
            info!(
                "OAuth consent client initialized ({} scope(s))",
                self.config.scopes.len()
            );
        }
        Ok(())
    }

    async fn request_credential(&self) -> Result<ConsentRequest, AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::NotReady);
        }

        let state = Uuid::new_v4().simple().to_string();
        let authorization_url = self.authorization_url(&state);
        *self
            .pending_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(state.clone());

        info!("Consent requested; waiting for the user to authorize");
        Ok(ConsentRequest {
            authorization_url,
            state,
        })
    }

    async fn complete_consent(&self, response: ConsentResponse) -> Result<Credential, AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::NotReady);
        }

        let expected = self.take_pending_state();

        if let Some(error) = response.error {
            let reason = response.error_description.unwrap_or(error);
            warn!("Consent was not granted: {}", reason);
            return Err(AuthError::ConsentDenied(reason));
        }

        if expected.is_none() || response.state != expected {
            warn!("Rejecting consent response with unexpected state");
            return Err(AuthError::StateMismatch);
        }

        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::ConsentDenied("consent response carried no access token".to_string())
            })?;

        let secs = response
            .expires_in
            .unwrap_or(self.config.token_lifetime_secs);
        let lifetime = lifetime_from_secs(secs).ok_or_else(|| {
            warn!("Rejecting consent response with token lifetime of {}s", secs);
            AuthError::ConsentDenied(format!("token lifetime of {}s is out of range", secs))
        })?;
        let credential = Credential::new(token, lifetime);

        self.credential.send_replace(Some(credential.clone()));
        info!("Credential acquired, expires at {}", credential.expires_at);
        Ok(credential)
    }

    fn current(&self) -> Option<Credential> {
        self.credential
            .borrow()
            .as_ref()
            .filter(|c| c.is_valid())
            .cloned()
    }

    async fn revoke(&self) -> Result<(), AuthError> {
        let Some(previous) = self.credential.send_replace(None) else {
            debug!("No credential to revoke");
            return Ok(());
        };

        let response = self
            .client
            .post(&self.config.revoke_endpoint)
            .form(&[("token", previous.access_token.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::RevokeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RevokeFailed(format!(
                "revoke endpoint returned {}",
                status
            )));
        }

        info!("Credential revoked");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credential.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier() -> OAuthConsentSupplier {
        OAuthConsentSupplier::new(AuthConfig {
            client_id: "1234.apps.googleusercontent.com".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn granted(state: &str) -> ConsentResponse {
        ConsentResponse {
            access_token: Some("ya29.granted".to_string()),
            expires_in: Some(3599),
            state: Some(state.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ensure_ready_rejects_placeholder_client_id() {
        let supplier = OAuthConsentSupplier::new(AuthConfig {
            client_id: "YOUR_CLIENT_ID.apps.googleusercontent.com".to_string(),
            ..Default::default()
        })
        .unwrap();

        let result = supplier.ensure_ready().await;
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_request_before_ready_fails() {
        let supplier = supplier();
        let result = supplier.request_credential().await;
        assert!(matches!(result, Err(AuthError::NotReady)));
    }

    #[tokio::test]
    async fn test_ensure_ready_is_idempotent() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();
        supplier.ensure_ready().await.unwrap();
        assert!(supplier.current().is_none());
    }

    #[tokio::test]
    async fn test_authorization_url() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();

        let request = supplier.request_credential().await.unwrap();
        let url = &request.authorization_url;

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=1234.apps.googleusercontent.com"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fyoutube.upload%20https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive.readonly"
        ));
        assert!(url.contains(&format!("state={}", request.state)));
    }

    #[tokio::test]
    async fn test_complete_consent_publishes_credential() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();
        let mut rx = supplier.subscribe();

        let request = supplier.request_credential().await.unwrap();
        let credential = supplier.complete_consent(granted(&request.state)).await.unwrap();

        assert!(credential.is_valid());
        assert_eq!(credential.access_token, "ya29.granted");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&credential));
        assert_eq!(supplier.current(), Some(credential));
        assert!(supplier.status().authenticated);
    }

    #[tokio::test]
    async fn test_complete_consent_rejects_wrong_state() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();
        supplier.request_credential().await.unwrap();

        let result = supplier.complete_consent(granted("forged")).await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
        assert!(supplier.current().is_none());
    }

    #[tokio::test]
    async fn test_complete_consent_without_request_fails() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();

        let result = supplier.complete_consent(granted("anything")).await;
        assert!(matches!(result, Err(AuthError::StateMismatch)));
    }

    #[tokio::test]
    async fn test_complete_consent_denied() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();
        let request = supplier.request_credential().await.unwrap();

        let result = supplier
            .complete_consent(ConsentResponse {
                error: Some("access_denied".to_string()),
                state: Some(request.state),
                ..Default::default()
            })
            .await;

        match result {
            Err(AuthError::ConsentDenied(reason)) => assert_eq!(reason, "access_denied"),
            other => panic!("expected ConsentDenied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_consent_rejects_out_of_range_lifetime() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();
        let request = supplier.request_credential().await.unwrap();

        let result = supplier
            .complete_consent(ConsentResponse {
                expires_in: Some(u64::MAX / 2),
                ..granted(&request.state)
            })
            .await;

        assert!(matches!(result, Err(AuthError::ConsentDenied(_))));
        assert!(supplier.current().is_none());
        assert!(!supplier.status().authenticated);
    }

    #[tokio::test]
    async fn test_new_consent_supersedes_previous() {
        let supplier = supplier();
        supplier.ensure_ready().await.unwrap();

        let first = supplier.request_credential().await.unwrap();
        supplier.complete_consent(granted(&first.state)).await.unwrap();

        let second = supplier.request_credential().await.unwrap();
        let mut response = granted(&second.state);
        response.access_token = Some("ya29.second".to_string());
        supplier.complete_consent(response).await.unwrap();

        assert_eq!(supplier.current().unwrap().access_token, "ya29.second");
    }

    #[tokio::test]
    async fn test_revoke_without_credential_is_noop() {
        let supplier = supplier();
        supplier.revoke().await.unwrap();
    }

    #[test]
    fn test_method_name() {
        assert_eq!(supplier().method_name(), "oauth_consent");
    }
}

//! Mock credential supplier for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

use super::fixtures;
use crate::auth::{AuthError, ConsentRequest, ConsentResponse, Credential, CredentialSupplier};

/// Mock implementation of the CredentialSupplier trait.
///
/// Starts either holding a valid credential or holding none. Consent
/// requests are counted and answered with a fake authorization URL;
/// `complete_consent` accepts any response carrying a token.
#[derive(Debug)]
pub struct MockCredentialSupplier {
    credential: watch::Sender<Option<Credential>>,
    ready: AtomicBool,
    fail_ready: AtomicBool,
    consent_requests: AtomicUsize,
    revocations: AtomicUsize,
}

impl Default for MockCredentialSupplier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCredentialSupplier {
    /// Create a supplier without a credential.
    pub fn new() -> Self {
        let (credential, _) = watch::channel(None);
        Self {
            credential,
            ready: AtomicBool::new(false),
            fail_ready: AtomicBool::new(false),
            consent_requests: AtomicUsize::new(0),
            revocations: AtomicUsize::new(0),
        }
    }

    /// Create a supplier already holding a valid credential.
    pub fn authenticated() -> Self {
        let supplier = Self::new();
        supplier.set_credential(Some(fixtures::credential()));
        supplier
    }

    /// Replace the held credential.
    pub fn set_credential(&self, credential: Option<Credential>) {
        self.credential.send_replace(credential);
    }

    /// Make `ensure_ready` fail with a configuration error.
    pub fn set_fail_ready(&self, fail: bool) {
        self.fail_ready.store(fail, Ordering::SeqCst);
    }

    /// Number of consent flows started.
    pub fn consent_requests(&self) -> usize {
        self.consent_requests.load(Ordering::SeqCst)
    }

    /// Number of revocations performed.
    pub fn revocations(&self) -> usize {
        self.revocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSupplier for MockCredentialSupplier {
    fn method_name(&self) -> &'static str {
        "mock"
    }

    async fn ensure_ready(&self) -> Result<(), AuthError> {
        if self.fail_ready.load(Ordering::SeqCst) {
            return Err(AuthError::Configuration("mock is not configured".to_string()));
        }
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn request_credential(&self) -> Result<ConsentRequest, AuthError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(AuthError::NotReady);
        }
        let n = self.consent_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let state = format!("mock-state-{}", n);
        Ok(ConsentRequest {
            authorization_url: format!("https://consent.mock/authorize?state={}", state),
            state,
        })
    }

    async fn complete_consent(&self, response: ConsentResponse) -> Result<Credential, AuthError> {
        if let Some(error) = response.error {
            return Err(AuthError::ConsentDenied(error));
        }
        let token = response
            .access_token
            .ok_or_else(|| AuthError::ConsentDenied("no access token".to_string()))?;
        let credential = Credential::new(
            token,
            chrono::Duration::seconds(response.expires_in.unwrap_or(3600) as i64),
        );
        self.set_credential(Some(credential.clone()));
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
        self.revocations.fetch_add(1, Ordering::SeqCst);
        self.set_credential(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credential.subscribe()
    }
}

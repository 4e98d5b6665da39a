mod consent;
mod static_token;
mod traits;
mod types;

pub use consent::*;
pub use static_token::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::AuthConfig;

/// Factory function to create the credential supplier from config
pub fn create_credential_supplier(
    config: &AuthConfig,
) -> Result<Arc<dyn CredentialSupplier>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::OauthConsent => Ok(Arc::new(OAuthConsentSupplier::new(config.clone())?)),
        AuthMethod::StaticToken => {
            let token = config.access_token.clone().ok_or_else(|| {
                AuthError::Configuration(
                    "access_token must be set when using static_token auth method".to_string(),
                )
            })?;
            let lifetime = lifetime_from_secs(config.token_lifetime_secs).ok_or_else(|| {
                AuthError::Configuration(format!(
                    "token_lifetime_secs must be at most {}",
                    MAX_TOKEN_LIFETIME_SECS
                ))
            })?;
            Ok(Arc::new(StaticTokenSupplier::new(token, lifetime)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;

    #[test]
    fn test_create_oauth_supplier() {
        let config = AuthConfig {
            client_id: "client.apps.googleusercontent.com".to_string(),
            ..Default::default()
        };
        let supplier = create_credential_supplier(&config).unwrap();
        assert_eq!(supplier.method_name(), "oauth_consent");
    }

    #[test]
    fn test_create_static_supplier() {
        let config = AuthConfig {
            method: AuthMethod::StaticToken,
            access_token: Some("ya29.token".to_string()),
            ..Default::default()
        };
        let supplier = create_credential_supplier(&config).unwrap();
        assert_eq!(supplier.method_name(), "static_token");
        assert!(supplier.current().is_some());
    }

    #[test]
    fn test_create_static_supplier_missing_token() {
        let config = AuthConfig {
            method: AuthMethod::StaticToken,
            access_token: None,
            ..Default::default()
        };
        let result = create_credential_supplier(&config);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_create_static_supplier_rejects_huge_lifetime() {
        let config = AuthConfig {
            method: AuthMethod::StaticToken,
            access_token: Some("ya29.token".to_string()),
            token_lifetime_secs: u64::MAX / 2,
            ..Default::default()
        };
        let result = create_credential_supplier(&config);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }
}

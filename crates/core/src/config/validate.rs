use super::{types::Config, AuthMethod, ConfigError};
use crate::auth::MAX_TOKEN_LIFETIME_SECS;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Credential settings match the selected auth method
/// - Token lifetime is between 1s and [`MAX_TOKEN_LIFETIME_SECS`]
/// - Upload chunk size is non-zero
/// - Remote endpoints are http(s) URLs
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    match config.auth.method {
        AuthMethod::OauthConsent => {
            if config.auth.client_id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "auth.client_id must be set when using oauth_consent".to_string(),
                ));
            }
        }
        AuthMethod::StaticToken => {
            if config
                .auth
                .access_token
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
            {
                return Err(ConfigError::ValidationError(
                    "auth.access_token must be set when using static_token".to_string(),
                ));
            }
        }
    }

    if config.auth.token_lifetime_secs == 0
        || config.auth.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS
    {
        return Err(ConfigError::ValidationError(format!(
            "auth.token_lifetime_secs must be between 1 and {}",
            MAX_TOKEN_LIFETIME_SECS
        )));
    }

    if config.uploader.transfer_chunk_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "uploader.transfer_chunk_bytes cannot be 0".to_string(),
        ));
    }

    for (field, url) in [
        ("auth.authorization_endpoint", &config.auth.authorization_endpoint),
        ("auth.revoke_endpoint", &config.auth.revoke_endpoint),
        ("fetcher.drive_files_endpoint", &config.fetcher.drive_files_endpoint),
        ("uploader.initiate_url", &config.uploader.initiate_url),
    ] {
        if !is_http_url(url) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an http(s) URL, got '{}'",
                field, url
            )));
        }
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

//! Shared utility functions for provider adapters.

use sq_domain::config::AuthConfig;
use sq_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key for a session.
///
/// Precedence:
/// 1. `supplied` (a key sent with the upload request), when non-blank
/// 2. `key` field (plaintext, warns)
/// 3. `env` field (reads environment variable)
/// 4. Error
pub fn resolve_api_key(auth: &AuthConfig, supplied: Option<&str>) -> Result<String> {
    if let Some(key) = supplied.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    if let Some(ref key) = auth.key {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; prefer 'env' instead"
        );
        return Ok(key.clone());
    }

    if let Some(ref env_var) = auth.env {
        return match std::env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(Error::Auth(format!(
                "no API key supplied and environment variable '{}' is not set",
                env_var
            ))),
        };
    }

    Err(Error::Auth(
        "no API key supplied and no 'key' or 'env' configured".into(),
    ))
}

/// Whether `key` carries the expected prefix. An empty prefix accepts
/// anything.
pub fn has_expected_prefix(key: &str, expected: &str) -> bool {
    expected.is_empty() || key.starts_with(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_key_wins() {
        let auth = AuthConfig {
            key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth, Some(" gsk_abc ")).unwrap(), "gsk_abc");
    }

    #[test]
    fn blank_supplied_key_falls_through() {
        let auth = AuthConfig {
            key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth, Some("  ")).unwrap(), "from-config");
    }

    #[test]
    fn env_var_is_read() {
        let var_name = "SQ_TEST_RESOLVE_ENV_KEY_1234";
        std::env::set_var(var_name, "env-secret-value");
        let auth = AuthConfig {
            env: Some(var_name.into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&auth, None).unwrap(), "env-secret-value");
        std::env::remove_var(var_name);
    }

    #[test]
    fn missing_env_var_is_an_auth_error() {
        let auth = AuthConfig {
            env: Some("SQ_TEST_NONEXISTENT_VAR_8888".into()),
            ..Default::default()
        };
        let err = resolve_api_key(&auth, None).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("SQ_TEST_NONEXISTENT_VAR_8888"));
    }

    #[test]
    fn no_source_is_an_auth_error() {
        let auth = AuthConfig {
            env: None,
            ..Default::default()
        };
        assert!(resolve_api_key(&auth, None).is_err());
    }

    #[test]
    fn prefix_check() {
        assert!(has_expected_prefix("gsk_123", "gsk_"));
        assert!(!has_expected_prefix("sk-123", "gsk_"));
        assert!(has_expected_prefix("anything", ""));
    }
}

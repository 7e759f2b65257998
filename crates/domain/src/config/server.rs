use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8000")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Environment variable holding the API bearer token.
    /// If the env var is set and non-empty, every route except `GET /`
    /// requires `Authorization: Bearer <token>`.
    /// If unset, the server logs a warning and allows unauthenticated access.
    #[serde(default = "d_api_token_env")]
    pub api_token_env: String,
    /// Largest accepted request body, in bytes. Bounds database uploads.
    #[serde(default = "d_max_upload")]
    pub max_upload_bytes: usize,
    /// Maximum number of requests processed concurrently.
    #[serde(default = "d_concurrency")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_8000(),
            host: d_host(),
            cors: CorsConfig::default(),
            api_token_env: d_api_token_env(),
            max_upload_bytes: d_max_upload(),
            max_concurrent_requests: d_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. `["*"]` allows any origin.
    /// Defaults to localhost-only.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8000() -> u16 {
    8000
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:*".into(),
        "http://127.0.0.1:*".into(),
    ]
}
fn d_api_token_env() -> String {
    "SQ_API_TOKEN".into()
}
fn d_max_upload() -> usize {
    64 * 1024 * 1024
}
fn d_concurrency() -> usize {
    64
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_parses_overrides() {
        let toml_str = r#"
            port = 8080
            host = "0.0.0.0"
            max_upload_bytes = 1024
        "#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.max_upload_bytes, 1024);
    }

    #[test]
    fn server_config_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.api_token_env, "SQ_API_TOKEN");
        assert_eq!(cfg.max_upload_bytes, 64 * 1024 * 1024);
        assert_eq!(cfg.max_concurrent_requests, 64);
    }
}

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "d_120000u")]
    pub timeout_ms: u64,
    /// Prefix a well-formed credential is expected to carry. A key without
    /// it is still used, but a warning is logged. Empty disables the check.
    #[serde(default = "d_key_prefix")]
    pub expected_key_prefix: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            temperature: 0.0,
            timeout_ms: d_120000u(),
            expected_key_prefix: d_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "d_provider_id")]
    pub id: String,
    #[serde(default = "d_kind")]
    pub kind: ProviderKind,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "d_model")]
    pub default_model: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: d_provider_id(),
            kind: d_kind(),
            base_url: d_base_url(),
            auth: AuthConfig::default(),
            default_model: d_model(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompat,
    AzureOpenai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header name (e.g. "Authorization", "api-key").
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix (e.g. "Bearer ").
    #[serde(default)]
    pub prefix: Option<String>,
    /// Env var containing the key.
    #[serde(default = "d_auth_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header: None,
            prefix: None,
            env: d_auth_env(),
            key: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_120000u() -> u64 {
    120_000
}
fn d_key_prefix() -> String {
    "gsk_".into()
}
fn d_provider_id() -> String {
    "groq".into()
}
fn d_kind() -> ProviderKind {
    ProviderKind::OpenaiCompat
}
fn d_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn d_model() -> Option<String> {
    Some("llama3-70b-8192".into())
}
fn d_auth_env() -> Option<String> {
    Some("GROQ_API_KEY".into())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_groq() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.provider.id, "groq");
        assert_eq!(cfg.provider.kind, ProviderKind::OpenaiCompat);
        assert_eq!(cfg.provider.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(cfg.provider.default_model.as_deref(), Some("llama3-70b-8192"));
        assert_eq!(cfg.provider.auth.env.as_deref(), Some("GROQ_API_KEY"));
        assert_eq!(cfg.timeout_ms, 120_000);
        assert_eq!(cfg.temperature, 0.0);
    }

    #[test]
    fn provider_section_deserializes() {
        let json = r#"{
            "provider": {
                "id": "azure",
                "kind": "azure_openai",
                "base_url": "https://example.openai.azure.com/openai/deployments/gpt",
                "auth": { "env": "AZURE_KEY", "header": "api-key" }
            },
            "temperature": 0.2
        }"#;
        let cfg: LlmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.provider.kind, ProviderKind::AzureOpenai);
        assert_eq!(cfg.provider.auth.header.as_deref(), Some("api-key"));
        assert_eq!(cfg.provider.auth.env.as_deref(), Some("AZURE_KEY"));
        assert!((cfg.temperature - 0.2).abs() < 1e-6);
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.provider.default_model.as_deref(), Some("llama3-70b-8192"));
        assert_eq!(cfg.expected_key_prefix, "gsk_");
    }
}

mod agent;
mod database;
mod llm;
mod server;
mod sessions;

pub use agent::*;
pub use database::*;
pub use llm::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.max_upload_bytes == 0 {
            errors.push(ConfigError::error(
                "server.max_upload_bytes",
                "max_upload_bytes must be greater than 0",
            ));
        }
        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError::error(
                "server.max_concurrent_requests",
                "max_concurrent_requests must be greater than 0",
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        let provider = &self.llm.provider;
        if provider.id.is_empty() {
            errors.push(ConfigError::error("llm.provider.id", "provider id must not be empty"));
        }
        if provider.base_url.is_empty() {
            errors.push(ConfigError::error(
                "llm.provider.base_url",
                "provider base_url must not be empty",
            ));
        }
        if provider.default_model.as_deref().map_or(true, str::is_empty) {
            errors.push(ConfigError::error(
                "llm.provider.default_model",
                "a default model is required",
            ));
        }
        if provider.auth.env.is_none() && provider.auth.key.is_none() {
            errors.push(ConfigError::warning(
                "llm.provider.auth",
                "no credential source configured; every upload must supply api_key",
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push(ConfigError::error(
                "llm.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }
        if self.llm.timeout_ms == 0 {
            errors.push(ConfigError::error("llm.timeout_ms", "timeout_ms must be greater than 0"));
        }

        if self.database.busy_timeout_ms == 0 {
            errors.push(ConfigError::warning(
                "database.busy_timeout_ms",
                "0 disables the busy timeout; concurrent access fails immediately",
            ));
        }

        if self.agent.max_generation_rounds == 0 {
            errors.push(ConfigError::error(
                "agent.max_generation_rounds",
                "max_generation_rounds must be at least 1",
            ));
        }

        if self.sessions.max_sessions == 0 {
            errors.push(ConfigError::error(
                "sessions.max_sessions",
                "max_sessions must be at least 1",
            ));
        }
        if self.sessions.idle_ttl_secs > 0 && self.sessions.prune_interval_secs == 0 {
            errors.push(ConfigError::error(
                "sessions.prune_interval_secs",
                "prune_interval_secs must be greater than 0 when idle_ttl_secs is set",
            ));
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_only(cfg: &Config) -> Vec<String> {
        cfg.validate()
            .into_iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn default_config_has_no_errors() {
        assert!(errors_only(&Config::default()).is_empty());
    }

    #[test]
    fn zero_rounds_is_an_error() {
        let mut cfg = Config::default();
        cfg.agent.max_generation_rounds = 0;
        assert_eq!(errors_only(&cfg), vec!["agent.max_generation_rounds"]);
    }

    #[test]
    fn missing_credential_source_is_a_warning() {
        let mut cfg = Config::default();
        cfg.llm.provider.auth.env = None;
        let issues = cfg.validate();
        assert!(issues.iter().any(|e| e.field == "llm.provider.auth"
            && e.severity == ConfigSeverity::Warning));
        assert!(errors_only(&cfg).is_empty());
    }

    #[test]
    fn wildcard_cors_warns() {
        let mut cfg = Config::default();
        cfg.server.cors.allowed_origins = vec!["*".into()];
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
        assert!(issues[0].to_string().starts_with("[WARN] server.cors.allowed_origins"));
    }

    #[test]
    fn out_of_range_temperature_is_an_error() {
        let mut cfg = Config::default();
        cfg.llm.temperature = 3.5;
        assert_eq!(errors_only(&cfg), vec!["llm.temperature"]);
    }
}

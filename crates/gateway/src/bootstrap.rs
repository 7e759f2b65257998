//! AppState construction and background-task spawning extracted from `main.rs`.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use sq_domain::config::{Config, ConfigSeverity};
use sq_sessions::SessionStore;

use crate::state::AppState;

/// Validate config and return a fully-wired [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Sessions ─────────────────────────────────────────────────────
    let sessions = Arc::new(SessionStore::new(&config.sessions));
    tracing::info!(
        max_sessions = config.sessions.max_sessions,
        idle_ttl_secs = config.sessions.idle_ttl_secs,
        "session store ready"
    );

    // ── API token (read once, hash for constant-time comparison) ────
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(t) => {
                tracing::info!(source = %format!("env:{env_var}"), "API bearer-token auth enabled");
                Some(Sha256::digest(t.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!("API bearer-token auth DISABLED, set the {env_var} env var to enable it");
                None
            }
        }
    };

    Ok(AppState {
        config,
        sessions,
        api_token_hash,
    })
}

/// Spawn the periodic maintenance loops.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Idle session pruning ─────────────────────────────────────────
    let cfg = &state.config.sessions;
    if cfg.idle_ttl_secs > 0 && cfg.prune_interval_secs > 0 {
        let sessions = state.sessions.clone();
        let every = std::time::Duration::from_secs(cfg.prune_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = sessions.prune_idle(chrono::Utc::now());
                if removed > 0 {
                    tracing::info!(removed, remaining = sessions.len(), "pruned idle sessions");
                }
            }
        });
    } else {
        tracing::info!("idle session pruning disabled");
    }
    tracing::info!("background tasks spawned");
}

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lifecycle rules for uploaded-database sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// A session unused for this many seconds is closed by the pruner.
    /// `0` disables idle pruning.
    #[serde(default = "d_idle_ttl")]
    pub idle_ttl_secs: u64,

    /// Upper bound on live sessions. Inserting beyond it evicts the least
    /// recently used session.
    #[serde(default = "d_max_sessions")]
    pub max_sessions: usize,

    /// How often the background pruner runs.
    #[serde(default = "d_prune_interval")]
    pub prune_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: d_idle_ttl(),
            max_sessions: d_max_sessions(),
            prune_interval_secs: d_prune_interval(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_idle_ttl() -> u64 {
    3600
}
fn d_max_sessions() -> usize {
    32
}
fn d_prune_interval() -> u64 {
    60
}

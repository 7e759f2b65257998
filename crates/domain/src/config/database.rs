use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Database access
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Rows sampled per table in schema output.
    #[serde(default = "d_15")]
    pub sample_rows: usize,
    /// Open the query executor read-only so mutating statements fail.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "d_5000u")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sample_rows: d_15(),
            read_only: false,
            busy_timeout_ms: d_5000u(),
        }
    }
}

fn d_15() -> usize {
    15
}
fn d_5000u() -> u64 {
    5000
}

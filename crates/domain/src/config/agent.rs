use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Visits to the query-generation step before a run gives up.
    #[serde(default = "d_10")]
    pub max_generation_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_generation_rounds: d_10(),
        }
    }
}

fn d_10() -> u32 {
    10
}

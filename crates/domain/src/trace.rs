use serde::Serialize;

/// Structured trace events emitted across all sqlagent crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    LlmRequest {
        provider: String,
        model: String,
        step: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    SessionCreated {
        session_id: String,
        tables: usize,
    },
    SessionClosed {
        session_id: String,
        reason: String,
    },
    ToolDispatched {
        step: String,
        tool_name: String,
        call_id: String,
        is_error: bool,
        duration_ms: u64,
    },
    QueryExecuted {
        rows: usize,
        duration_ms: u64,
        ok: bool,
    },
    RunFinished {
        run_id: String,
        status: String,
        rounds: u32,
        messages: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sq_event");
    }
}

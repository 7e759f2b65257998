use serde::{Deserialize, Serialize};
use sq_domain::error::Result;
use sq_domain::tool::{Message, ToolCall, ToolDefinition};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send, system prompt first.
    pub messages: Vec<Message>,
    /// Tool definitions the model may invoke.
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature (0.0 – 2.0). `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
    /// Model identifier override. When `None`, the provider uses its default.
    pub model: Option<String>,
}

/// A provider-agnostic chat completion response.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Textual content of the response.
    pub content: String,
    /// Tool calls emitted by the model.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information.
    pub usage: Option<Usage>,
    /// The model that actually produced the response.
    pub model: String,
    /// The reason the model stopped generating (e.g. "stop", "tool_calls").
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Convert the reply into the assistant message appended to a transcript.
    pub fn into_message(self) -> Message {
        if self.tool_calls.is_empty() {
            Message::assistant(self.content)
        } else {
            Message::assistant_with_tool_calls(&self.content, &self.tool_calls)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait that every completion backend must implement.
///
/// The HTTP adapter translates between our internal types and the OpenAI
/// chat-completions wire format; the scripted provider replays canned
/// replies for deterministic runs.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full response.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;

    /// The model used when a request does not override it.
    fn default_model(&self) -> &str;
}

use serde::{Deserialize, Serialize};

/// Internal tool call format (provider-agnostic).
/// Every adapter converts provider-specific tool calls to/from this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

/// Tool definition exposed to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A message in the conversation (provider-agnostic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

// ── Convenience constructors ───────────────────────────────────────

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: MessageContent::Text(text.into()) }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: MessageContent::Text(text.into()) }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Text(text.into()) }
    }
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tool_result_with_status(tool_use_id, content, false)
    }
    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::tool_result_with_status(tool_use_id, content, true)
    }

    fn tool_result_with_status(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Parts(vec![ContentPart::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error,
            }]),
        }
    }

    /// Build an assistant message carrying optional text plus tool calls.
    pub fn assistant_with_tool_calls(text: &str, tool_calls: &[ToolCall]) -> Self {
        let mut parts = Vec::new();

        if !text.is_empty() {
            parts.push(ContentPart::Text {
                text: text.to_string(),
            });
        }

        for tc in tool_calls {
            parts.push(ContentPart::ToolUse {
                id: tc.call_id.clone(),
                name: tc.tool_name.clone(),
                input: tc.arguments.clone(),
            });
        }

        Self {
            role: Role::Assistant,
            content: MessageContent::Parts(parts),
        }
    }

    /// Tool calls carried by this message (empty unless it is an
    /// assistant message with `tool_use` parts).
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::ToolUse { id, name, input } => Some(ToolCall {
                        call_id: id.clone(),
                        tool_name: name.clone(),
                        arguments: input.clone(),
                    }),
                    _ => None,
                })
                .collect(),
        }
    }

    /// The call id this message answers, if it is a tool result.
    pub fn tool_result_id(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                _ => None,
            }),
            MessageContent::Text(_) => None,
        }
    }

    /// The textual body used for routing decisions: plain text for
    /// user/assistant messages, the result content for tool messages.
    pub fn text_content(&self) -> String {
        match &self.content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ToolResult { content, .. } => Some(content.as_str()),
                    ContentPart::ToolUse { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl MessageContent {
    /// Extract the plain-text content (first text part, or the full text).
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// Concatenate every text part, newline separated.
    pub fn extract_all_text(&self) -> String {
        match self {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

//! OpenAI-compatible adapter.
//!
//! Works with Groq, OpenAI, Azure OpenAI, Ollama, vLLM, LM Studio and any
//! other endpoint that follows the OpenAI chat completions contract.

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::from_reqwest;
use serde_json::Value;
use sq_domain::config::{ProviderConfig, ProviderKind};
use sq_domain::error::{Error, Result};
use sq_domain::tool::{ContentPart, Message, MessageContent, Role, ToolCall, ToolDefinition};
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
///
/// Also handles Azure OpenAI, which uses the same wire format but with a
/// different URL pattern (`/openai/deployments/{model}/chat/completions`)
/// and auth header (`api-key` instead of `Authorization: Bearer`).
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    auth_header: String,
    auth_prefix: String,
    default_model: String,
    client: reqwest::Client,
    /// When true, uses Azure OpenAI URL pattern and omits `model` from body.
    is_azure: bool,
}

impl OpenAiCompatProvider {
    /// Create a new provider from the provider config and an already
    /// resolved credential.
    pub fn from_config(cfg: &ProviderConfig, api_key: String, timeout: Duration) -> Result<Self> {
        let is_azure = cfg.kind == ProviderKind::AzureOpenai;

        let auth_header = cfg.auth.header.clone().unwrap_or_else(|| {
            if is_azure {
                "api-key".into()
            } else {
                "Authorization".into()
            }
        });
        let auth_prefix = cfg.auth.prefix.clone().unwrap_or_else(|| {
            if is_azure {
                String::new()
            } else {
                "Bearer ".into()
            }
        });

        let default_model = cfg
            .default_model
            .clone()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::Config(format!("provider '{}' has no default_model", cfg.id)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            auth_header,
            auth_prefix,
            default_model,
            client,
            is_azure,
        })
    }

    // ── Internal: build authenticated request builder ──────────────

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        let header_value = format!("{}{}", self.auth_prefix, self.api_key);
        self.client
            .post(url)
            .header(&self.auth_header, &header_value)
            .header("Content-Type", "application/json")
    }

    // ── Internal: build the JSON body ─────────────────────────────

    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn chat_url(&self, req: &ChatRequest) -> String {
        if self.is_azure {
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version=2024-10-21",
                self.base_url,
                self.effective_model(req)
            )
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "messages": messages,
            "stream": false,
        });

        // Azure embeds the deployment name in the URL.
        if !self.is_azure {
            body["model"] = Value::String(self.effective_model(req));
        }

        if !req.tools.is_empty() {
            let tools: Vec<Value> = req.tools.iter().map(tool_to_openai).collect();
            body["tools"] = Value::Array(tools);
        }
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message serialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn msg_to_openai(msg: &Message) -> Value {
    match msg.role {
        Role::Tool => tool_result_to_openai(msg),
        Role::Assistant => assistant_to_openai(msg),
        _ => serde_json::json!({
            "role": role_to_str(msg.role),
            "content": msg.content.extract_all_text(),
        }),
    }
}

fn assistant_to_openai(msg: &Message) -> Value {
    let mut obj = serde_json::json!({"role": "assistant"});
    let mut text_parts: Vec<&str> = Vec::new();
    let mut tool_calls: Vec<Value> = Vec::new();

    match &msg.content {
        MessageContent::Text(t) => text_parts.push(t),
        MessageContent::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => text_parts.push(text),
                    ContentPart::ToolUse { id, name, input } => {
                        tool_calls.push(serde_json::json!({
                            "id": id,
                            "type": "function",
                            "function": {
                                "name": name,
                                "arguments": input.to_string(),
                            }
                        }));
                    }
                    ContentPart::ToolResult { .. } => {}
                }
            }
        }
    }

    obj["content"] = if text_parts.is_empty() {
        Value::Null
    } else {
        Value::String(text_parts.join("\n"))
    };
    if !tool_calls.is_empty() {
        obj["tool_calls"] = Value::Array(tool_calls);
    }
    obj
}

fn tool_result_to_openai(msg: &Message) -> Value {
    serde_json::json!({
        "role": "tool",
        "tool_call_id": msg.tool_result_id().unwrap_or_default(),
        "content": msg.text_content(),
    })
}

fn tool_to_openai(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(provider: &str, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: provider.into(),
            message: "no choices in response".into(),
        })?;

    let message = choice.get("message").ok_or_else(|| Error::Provider {
        provider: provider.into(),
        message: "no message in choice".into(),
    })?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(ChatResponse {
        content,
        tool_calls: parse_openai_tool_calls(message),
        usage: body.get("usage").and_then(parse_openai_usage),
        model,
        finish_reason,
    })
}

/// Tool calls whose `arguments` string is not valid JSON are kept with the
/// raw string under `"_raw"` so the caller can report the malformed call.
fn parse_openai_tool_calls(message: &Value) -> Vec<ToolCall> {
    let Some(arr) = message.get("tool_calls").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|tc| {
            let call_id = tc.get("id")?.as_str()?.to_string();
            let func = tc.get("function")?;
            let tool_name = func.get("name")?.as_str()?.to_string();
            let arguments = match func.get("arguments") {
                Some(Value::String(s)) if s.trim().is_empty() => {
                    Value::Object(Default::default())
                }
                Some(Value::String(s)) => serde_json::from_str(s)
                    .unwrap_or_else(|_| serde_json::json!({ "_raw": s })),
                Some(obj @ Value::Object(_)) => obj.clone(),
                _ => Value::Object(Default::default()),
            };
            Some(ToolCall {
                call_id,
                tool_name,
                arguments,
            })
        })
        .collect()
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url(req);
        let body = self.build_chat_body(req);

        tracing::debug!(provider = %self.id, url = %url, "openai_compat chat request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Auth(format!(
                "provider '{}' rejected the credential (HTTP {})",
                self.id,
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&self.id, &resp_json)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

//! A provider that replays canned replies in order.
//!
//! Drives the agent loop deterministically in tests and offline demos.
//! Every request is recorded so callers can inspect what was sent.

use crate::traits::{ChatRequest, ChatResponse, LlmProvider};
use parking_lot::Mutex;
use sq_domain::error::{Error, Result};
use sq_domain::tool::ToolCall;
use std::collections::VecDeque;

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = ChatResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure to be returned by the next unanswered request.
    pub fn push_error(&self, err: Error) {
        self.replies.lock().push_back(Err(err));
    }

    /// Plain-text reply.
    pub fn text(content: impl Into<String>) -> ChatResponse {
        ChatResponse {
            content: content.into(),
            model: "scripted".into(),
            finish_reason: Some("stop".into()),
            ..Default::default()
        }
    }

    /// Reply consisting of a single tool call.
    pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ChatResponse {
        ChatResponse {
            tool_calls: vec![ToolCall {
                call_id: id.into(),
                tool_name: name.into(),
                arguments,
            }],
            model: "scripted".into(),
            finish_reason: Some("tool_calls".into()),
            ..Default::default()
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req.clone());
        self.replies.lock().pop_front().unwrap_or_else(|| {
            Err(Error::Provider {
                provider: "scripted".into(),
                message: "script exhausted".into(),
            })
        })
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

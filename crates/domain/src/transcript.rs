//! Append-only message log for a single agent run.
//!
//! A transcript is created when a run starts and dropped when it ends; it is
//! never persisted. Entries can only be appended, never reordered or removed.

use serde::Serialize;

use crate::tool::{Message, Role};

/// The ordered message log driving one agent run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

/// A broken tool-call/tool-result pairing found by [`Transcript::check_pairing`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingViolation {
    #[error("tool result at index {index} does not follow an assistant message")]
    OrphanResult { index: usize },
    #[error("tool result at index {index} answers unknown or already answered call '{call_id}'")]
    UnexpectedCallId { index: usize, call_id: String },
    #[error("assistant message at index {index} left call '{call_id}' unanswered")]
    Unanswered { index: usize, call_id: String },
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Verify that every tool result answers exactly one pending call of the
    /// immediately preceding assistant message, and that every call was
    /// answered before the next non-tool message.
    pub fn check_pairing(&self) -> Result<(), PairingViolation> {
        // (assistant index, call ids still waiting for a result)
        let mut pending: Option<(usize, Vec<String>)> = None;

        for (index, msg) in self.messages.iter().enumerate() {
            if msg.role == Role::Tool {
                let Some((_, ids)) = pending.as_mut() else {
                    return Err(PairingViolation::OrphanResult { index });
                };
                let call_id = msg.tool_result_id().unwrap_or_default().to_string();
                match ids.iter().position(|id| *id == call_id) {
                    Some(pos) => {
                        ids.remove(pos);
                    }
                    None => return Err(PairingViolation::UnexpectedCallId { index, call_id }),
                }
                continue;
            }

            if let Some((at, ids)) = pending.take() {
                if let Some(call_id) = ids.into_iter().next() {
                    return Err(PairingViolation::Unanswered { index: at, call_id });
                }
            }

            if msg.role == Role::Assistant {
                let ids = msg.tool_calls().into_iter().map(|tc| tc.call_id).collect();
                pending = Some((index, ids));
            }
        }

        if let Some((at, ids)) = pending {
            if let Some(call_id) = ids.into_iter().next() {
                return Err(PairingViolation::Unanswered { index: at, call_id });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolCall;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            call_id: id.into(),
            tool_name: "list_tables".into(),
            arguments: serde_json::json!({}),
        }
    }

    #[test]
    fn answered_calls_pass() {
        let mut t = Transcript::new();
        t.push(Message::user("how many rows?"));
        t.push(Message::assistant_with_tool_calls("", &[call("a"), call("b")]));
        t.push(Message::tool_result("b", "ok"));
        t.push(Message::tool_result("a", "ok"));
        t.push(Message::assistant("SELECT 1"));
        assert_eq!(t.check_pairing(), Ok(()));
    }

    #[test]
    fn unanswered_call_is_reported() {
        let mut t = Transcript::new();
        t.push(Message::assistant_with_tool_calls("", &[call("a"), call("b")]));
        t.push(Message::tool_result("a", "ok"));
        t.push(Message::assistant("next"));
        assert_eq!(
            t.check_pairing(),
            Err(PairingViolation::Unanswered { index: 0, call_id: "b".into() })
        );
    }

    #[test]
    fn trailing_unanswered_call_is_reported() {
        let mut t = Transcript::new();
        t.push(Message::assistant_with_tool_calls("", &[call("a")]));
        assert!(matches!(t.check_pairing(), Err(PairingViolation::Unanswered { .. })));
    }

    #[test]
    fn duplicate_answer_is_rejected() {
        let mut t = Transcript::new();
        t.push(Message::assistant_with_tool_calls("", &[call("a")]));
        t.push(Message::tool_result("a", "ok"));
        t.push(Message::tool_result("a", "again"));
        assert_eq!(
            t.check_pairing(),
            Err(PairingViolation::UnexpectedCallId { index: 2, call_id: "a".into() })
        );
    }

    #[test]
    fn result_without_assistant_is_orphaned() {
        let mut t = Transcript::new();
        t.push(Message::user("q"));
        t.push(Message::tool_result("a", "ok"));
        assert_eq!(t.check_pairing(), Err(PairingViolation::OrphanResult { index: 1 }));
    }
}

//! Steps of the agent loop and the routing decision taken after each
//! generation reply.

use std::fmt;

use sq_domain::tool::Message;

use super::tools::{AgentTool, SUBMIT_FINAL_ANSWER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Init,
    ListTables,
    FetchSchema,
    GenerateQuery,
    CheckQuery,
    ExecuteQuery,
    Done,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ListTables => "list_tables",
            Self::FetchSchema => "fetch_schema",
            Self::GenerateQuery => "generate_query",
            Self::CheckQuery => "check_query",
            Self::ExecuteQuery => "execute_query",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the loop goes after a `generate_query` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRoute {
    /// `SubmitFinalAnswer` was called with a usable answer.
    Submit { call_id: String, answer: String },
    /// The reply called tools, none of them a usable final answer. Each
    /// call gets a corrective result and generation runs again.
    Correct,
    /// The reply text is itself an error report; generate again.
    Retry,
    /// Plain text, taken to be a query for the check step.
    Check,
}

pub fn route_generation(reply: &Message) -> GenerationRoute {
    let calls = reply.tool_calls();

    let submitted = calls
        .iter()
        .filter(|c| c.tool_name == SUBMIT_FINAL_ANSWER)
        .find_map(|c| match AgentTool::from_call(c) {
            Ok(AgentTool::SubmitFinalAnswer { final_answer }) => {
                Some((c.call_id.clone(), final_answer))
            }
            _ => None,
        });
    if let Some((call_id, answer)) = submitted {
        return GenerationRoute::Submit { call_id, answer };
    }

    if !calls.is_empty() {
        GenerationRoute::Correct
    } else if reply.text_content().starts_with("Error:") {
        GenerationRoute::Retry
    } else {
        GenerationRoute::Check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sq_domain::tool::ToolCall;

    fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: id.into(),
            tool_name: name.into(),
            arguments: args,
        }
    }

    #[test]
    fn final_answer_wins_over_other_calls() {
        let reply = Message::assistant_with_tool_calls(
            "",
            &[
                call("a", "execute_query", json!({"query": "SELECT 1"})),
                call("b", SUBMIT_FINAL_ANSWER, json!({"final_answer": "There are 2 rows."})),
            ],
        );
        assert_eq!(
            route_generation(&reply),
            GenerationRoute::Submit {
                call_id: "b".into(),
                answer: "There are 2 rows.".into()
            }
        );
    }

    #[test]
    fn wrong_tool_or_bad_answer_needs_correction() {
        let wrong = Message::assistant_with_tool_calls(
            "",
            &[call("a", "execute_query", json!({"query": "SELECT 1"}))],
        );
        assert_eq!(route_generation(&wrong), GenerationRoute::Correct);

        let malformed =
            Message::assistant_with_tool_calls("", &[call("a", SUBMIT_FINAL_ANSWER, json!({}))]);
        assert_eq!(route_generation(&malformed), GenerationRoute::Correct);
    }

    #[test]
    fn text_replies_route_on_error_prefix() {
        assert_eq!(
            route_generation(&Message::assistant("Error: no such column")),
            GenerationRoute::Retry
        );
        assert_eq!(
            route_generation(&Message::assistant("SELECT count(*) FROM T1;")),
            GenerationRoute::Check
        );
    }

    #[test]
    fn step_names() {
        assert_eq!(Step::GenerateQuery.to_string(), "generate_query");
        assert_eq!(Step::Done.as_str(), "done");
    }
}

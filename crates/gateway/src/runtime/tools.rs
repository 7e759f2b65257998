//! The agent's tool surface: definitions offered to the model, parsing of
//! the model's tool calls into [`AgentTool`], and dispatch against the
//! session database.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use sq_domain::tool::{Message, ToolCall, ToolDefinition};
use sq_domain::trace::TraceEvent;
use sq_tools::{render, SqliteDatabase};

pub const LIST_TABLES: &str = "list_tables";
pub const GET_SCHEMA: &str = "get_schema";
pub const EXECUTE_QUERY: &str = "execute_query";
pub const SUBMIT_FINAL_ANSWER: &str = "SubmitFinalAnswer";

/// Older prompts name the query tool this way.
const EXECUTE_QUERY_ALIAS: &str = "db_query_tool";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AgentTool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A parsed tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTool {
    ListTables,
    GetSchema { table_names: String },
    ExecuteQuery { query: String },
    SubmitFinalAnswer { final_answer: String },
}

#[derive(Deserialize)]
struct GetSchemaArgs {
    table_names: String,
}

#[derive(Deserialize)]
struct ExecuteQueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct SubmitFinalAnswerArgs {
    final_answer: String,
}

impl AgentTool {
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolFault> {
        match call.tool_name.as_str() {
            LIST_TABLES => Ok(Self::ListTables),
            GET_SCHEMA => {
                let args: GetSchemaArgs = parse_args(call)?;
                Ok(Self::GetSchema {
                    table_names: args.table_names,
                })
            }
            EXECUTE_QUERY | EXECUTE_QUERY_ALIAS => {
                let args: ExecuteQueryArgs = parse_args(call)?;
                Ok(Self::ExecuteQuery { query: args.query })
            }
            SUBMIT_FINAL_ANSWER => {
                let args: SubmitFinalAnswerArgs = parse_args(call)?;
                Ok(Self::SubmitFinalAnswer {
                    final_answer: args.final_answer,
                })
            }
            other => Err(ToolFault::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListTables => LIST_TABLES,
            Self::GetSchema { .. } => GET_SCHEMA,
            Self::ExecuteQuery { .. } => EXECUTE_QUERY,
            Self::SubmitFinalAnswer { .. } => SUBMIT_FINAL_ANSWER,
        }
    }
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T, ToolFault> {
    // Providers send `{}` or nothing at all for argument-less calls.
    let value = if call.arguments.is_null() {
        serde_json::json!({})
    } else {
        call.arguments.clone()
    };
    serde_json::from_value(value).map_err(|e| ToolFault::MalformedArguments {
        tool: call.tool_name.clone(),
        message: e.to_string(),
    })
}

/// A tool invocation that could not run. Rendered back to the model as a
/// corrective tool result instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolFault {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("'{0}' is not available at this step")]
    NotOffered(String),
    #[error("malformed arguments for '{tool}': {message}")]
    MalformedArguments { tool: String, message: String },
    #[error("tool worker failed: {0}")]
    Worker(String),
}

impl ToolFault {
    pub fn corrective_text(&self) -> String {
        format!("Error: {self}\nplease fix your mistakes.")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool definitions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn list_tables_definition() -> ToolDefinition {
    ToolDefinition {
        name: LIST_TABLES.into(),
        description: "List the tables in the database as a comma-separated string.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn get_schema_definition() -> ToolDefinition {
    ToolDefinition {
        name: GET_SCHEMA.into(),
        description: "Get the schema and sample rows for the given tables. \
                      Input is a comma-separated list of table names."
            .into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "table_names": {
                    "type": "string",
                    "description": "Comma-separated table names, e.g. \"table1, table2\""
                }
            },
            "required": ["table_names"]
        }),
    }
}

pub fn execute_query_definition() -> ToolDefinition {
    ToolDefinition {
        name: EXECUTE_QUERY.into(),
        description: "Execute a SQL query against the database and get back the result. \
                      If the query is not correct, an error message will be returned. \
                      If an error is returned, rewrite the query, check the query, and try again."
            .into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "A single SQLite statement" }
            },
            "required": ["query"]
        }),
    }
}

pub fn submit_final_answer_definition() -> ToolDefinition {
    ToolDefinition {
        name: SUBMIT_FINAL_ANSWER.into(),
        description: "Submit the final answer to the user based on the query results.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "final_answer": { "type": "string", "description": "The answer for the user" }
            },
            "required": ["final_answer"]
        }),
    }
}

/// The database tools offered at the check step.
pub fn database_tools() -> Vec<ToolDefinition> {
    vec![
        list_tables_definition(),
        get_schema_definition(),
        execute_query_definition(),
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one tool call and build the tool-result message answering it.
///
/// `offered` lists the tool names the current step accepts; anything else
/// is answered with a corrective error. Database work runs on the blocking
/// pool with its own connection.
pub async fn dispatch(
    db: &SqliteDatabase,
    call: &ToolCall,
    offered: &[&str],
    step: &str,
) -> Message {
    let started = Instant::now();

    let outcome = match AgentTool::from_call(call) {
        Ok(tool) if !offered.contains(&tool.name()) => {
            Err(ToolFault::NotOffered(call.tool_name.clone()))
        }
        Ok(tool) => run_tool(db.clone(), tool).await,
        Err(fault) => Err(fault),
    };

    let (content, is_error) = match outcome {
        Ok(text) => {
            let is_error = text.starts_with("Error:");
            (text, is_error)
        }
        Err(fault) => {
            tracing::warn!(tool = %call.tool_name, call_id = %call.call_id, error = %fault, "tool fault");
            (fault.corrective_text(), true)
        }
    };

    TraceEvent::ToolDispatched {
        step: step.to_string(),
        tool_name: call.tool_name.clone(),
        call_id: call.call_id.clone(),
        is_error,
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();

    if is_error {
        Message::tool_error(&call.call_id, content)
    } else {
        Message::tool_result(&call.call_id, content)
    }
}

async fn run_tool(db: SqliteDatabase, tool: AgentTool) -> Result<String, ToolFault> {
    tokio::task::spawn_blocking(move || match tool {
        AgentTool::ListTables => Ok(render::list_tables(&db)),
        AgentTool::GetSchema { table_names } => Ok(render::get_schema(&db, &table_names)),
        AgentTool::ExecuteQuery { query } => Ok(render::execute_query(&db, &query)),
        AgentTool::SubmitFinalAnswer { .. } => {
            Err(ToolFault::NotOffered(SUBMIT_FINAL_ANSWER.into()))
        }
    })
    .await
    .map_err(|e| ToolFault::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: "c1".into(),
            tool_name: name.into(),
            arguments: args,
        }
    }

    #[test]
    fn parses_each_tool() {
        assert_eq!(
            AgentTool::from_call(&call(LIST_TABLES, serde_json::Value::Null)).unwrap(),
            AgentTool::ListTables
        );
        assert_eq!(
            AgentTool::from_call(&call(GET_SCHEMA, json!({"table_names": "a, b"}))).unwrap(),
            AgentTool::GetSchema {
                table_names: "a, b".into()
            }
        );
        assert_eq!(
            AgentTool::from_call(&call("db_query_tool", json!({"query": "SELECT 1"}))).unwrap(),
            AgentTool::ExecuteQuery {
                query: "SELECT 1".into()
            }
        );
        assert_eq!(
            AgentTool::from_call(&call(SUBMIT_FINAL_ANSWER, json!({"final_answer": "2"})))
                .unwrap()
                .name(),
            SUBMIT_FINAL_ANSWER
        );
    }

    #[test]
    fn unknown_and_malformed_calls_are_faults() {
        assert_eq!(
            AgentTool::from_call(&call("drop_everything", json!({}))).unwrap_err(),
            ToolFault::UnknownTool("drop_everything".into())
        );
        let fault = AgentTool::from_call(&call(EXECUTE_QUERY, json!({"_raw": "{oops"}))).unwrap_err();
        assert!(matches!(fault, ToolFault::MalformedArguments { .. }));
        assert!(fault.corrective_text().starts_with("Error: malformed arguments for 'execute_query'"));
        assert!(fault.corrective_text().ends_with("\nplease fix your mistakes."));
    }

    #[test]
    fn database_tools_never_offer_the_final_answer() {
        let names: Vec<String> = database_tools().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec![LIST_TABLES, GET_SCHEMA, EXECUTE_QUERY]);
    }

    #[tokio::test]
    async fn dispatch_answers_the_call_it_was_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (7);")
            .unwrap();
        let db = SqliteDatabase::open(&path, Default::default()).unwrap();

        let msg = dispatch(
            &db,
            &call(EXECUTE_QUERY, json!({"query": "SELECT x FROM t"})),
            &[EXECUTE_QUERY],
            "execute_query",
        )
        .await;
        assert_eq!(msg.tool_result_id(), Some("c1"));
        assert_eq!(msg.text_content(), "x\n7\n");

        let msg = dispatch(
            &db,
            &call(SUBMIT_FINAL_ANSWER, json!({"final_answer": "7"})),
            &[LIST_TABLES, GET_SCHEMA, EXECUTE_QUERY],
            "execute_query",
        )
        .await;
        assert_eq!(
            msg.text_content(),
            "Error: 'SubmitFinalAnswer' is not available at this step\nplease fix your mistakes."
        );
    }
}

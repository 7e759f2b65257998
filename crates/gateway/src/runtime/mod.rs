//! Agent runtime: drives one question through the step graph
//! `init → list_tables → fetch_schema → generate_query ⇄ check_query →
//! execute_query → … → done` against a session's database and provider.
//!
//! Entry point: [`run_query`].

pub mod graph;
pub mod prompts;
pub mod tools;

use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;

use sq_domain::config::Config;
use sq_domain::error::Result;
use sq_domain::tool::{Message, ToolCall, ToolDefinition};
use sq_domain::trace::TraceEvent;
use sq_domain::transcript::Transcript;
use sq_providers::ChatRequest;
use sq_sessions::Session;

use graph::{GenerationRoute, Step};
use tools::{AgentTool, EXECUTE_QUERY, GET_SCHEMA, LIST_TABLES, SUBMIT_FINAL_ANSWER};

/// Call id of the synthetic `list_tables` request that opens every run.
pub const INIT_CALL_ID: &str = "tool_init";
/// Call id of the synthetic `get_schema` request used when the model asks
/// for no schema.
pub const SCHEMA_CALL_ID: &str = "tool_schema";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Result of one agent run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub status: RunStatus,
    pub answer: String,
    pub run_id: uuid::Uuid,
    /// Generation rounds used.
    pub rounds: u32,
    pub transcript: Transcript,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// run_query
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Answer `question` against the session's database.
///
/// Schema and query failures are fed back to the model and never surface
/// here. A provider failure aborts the run and is returned as `Err`.
pub async fn run_query(session: &Session, question: &str, config: &Config) -> Result<AgentOutcome> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("agent_run", %run_id, session_id = %session.id);

    async move {
        tracing::debug!("run started");
        let mut run = AgentRun::new(session, config);
        let result = run.drive(question).await;

        let status = match &result {
            Ok(Some(_)) => RunStatus::Success.as_str(),
            Ok(None) => RunStatus::Error.as_str(),
            Err(_) => "failed",
        };
        TraceEvent::RunFinished {
            run_id: run_id.to_string(),
            status: status.into(),
            rounds: run.rounds,
            messages: run.transcript.len(),
        }
        .emit();

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => return Err(e),
        };
        if let Err(violation) = run.transcript.check_pairing() {
            tracing::error!(error = %violation, "transcript pairing broken");
        }

        Ok(match answer {
            Some(answer) => AgentOutcome {
                status: RunStatus::Success,
                answer,
                run_id,
                rounds: run.rounds,
                transcript: run.transcript,
            },
            None => AgentOutcome {
                status: RunStatus::Error,
                answer: prompts::NO_ANSWER.into(),
                run_id,
                rounds: run.rounds,
                transcript: run.transcript,
            },
        })
    }
    .instrument(span)
    .await
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AgentRun — per-run state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct AgentRun<'a> {
    session: &'a Session,
    config: &'a Config,
    transcript: Transcript,
    rounds: u32,
    /// Output of the opening `list_tables` call.
    table_list: String,
    answer: Option<String>,
}

impl<'a> AgentRun<'a> {
    fn new(session: &'a Session, config: &'a Config) -> Self {
        Self {
            session,
            config,
            transcript: Transcript::new(),
            rounds: 0,
            table_list: String::new(),
            answer: None,
        }
    }

    async fn drive(&mut self, question: &str) -> Result<Option<String>> {
        let mut step = Step::Init;
        loop {
            tracing::debug!(%step, rounds = self.rounds, "agent step");
            step = match step {
                Step::Init => self.init(question),
                Step::ListTables => self.list_tables().await,
                Step::FetchSchema => self.fetch_schema().await?,
                Step::GenerateQuery => self.generate().await?,
                Step::CheckQuery => self.check().await?,
                Step::ExecuteQuery => self.execute().await,
                Step::Done => return Ok(self.answer.take()),
            };
        }
    }

    fn init(&mut self, question: &str) -> Step {
        self.transcript.push(Message::user(question));
        self.transcript.push(Message::assistant_with_tool_calls(
            "",
            &[ToolCall {
                call_id: INIT_CALL_ID.into(),
                tool_name: LIST_TABLES.into(),
                arguments: serde_json::json!({}),
            }],
        ));
        Step::ListTables
    }

    async fn list_tables(&mut self) -> Step {
        self.answer_calls(&[LIST_TABLES], Step::ListTables).await;
        if let Some(result) = self.transcript.last() {
            let text = result.text_content();
            if !text.starts_with("Error:") {
                self.table_list = text;
            }
        }
        Step::FetchSchema
    }

    async fn fetch_schema(&mut self) -> Result<Step> {
        let reply = self
            .complete(
                Step::FetchSchema,
                self.transcript.messages().to_vec(),
                vec![tools::get_schema_definition()],
            )
            .await?;

        let calls = reply.tool_calls();
        let requested = calls.iter().any(|c| c.tool_name == GET_SCHEMA);
        if !calls.is_empty() || !reply.text_content().trim().is_empty() {
            self.transcript.push(reply);
            self.answer_calls(&[GET_SCHEMA], Step::FetchSchema).await;
        }

        if !requested {
            tracing::debug!("no schema requested, fetching every table");
            self.transcript.push(Message::assistant_with_tool_calls(
                "",
                &[ToolCall {
                    call_id: SCHEMA_CALL_ID.into(),
                    tool_name: GET_SCHEMA.into(),
                    arguments: serde_json::json!({ "table_names": self.table_list }),
                }],
            ));
            self.answer_calls(&[GET_SCHEMA], Step::FetchSchema).await;
        }

        Ok(Step::GenerateQuery)
    }

    async fn generate(&mut self) -> Result<Step> {
        if self.rounds >= self.config.agent.max_generation_rounds {
            tracing::warn!(rounds = self.rounds, "round cap reached without a final answer");
            return Ok(Step::Done);
        }
        self.rounds += 1;

        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(Message::system(prompts::QUERY_GEN_SYSTEM));
        messages.extend_from_slice(self.transcript.messages());

        let reply = self
            .complete(
                Step::GenerateQuery,
                messages,
                vec![tools::submit_final_answer_definition()],
            )
            .await?;
        let route = graph::route_generation(&reply);
        let calls = reply.tool_calls();
        self.transcript.push(reply);

        match route {
            GenerationRoute::Submit { call_id, answer } => {
                for call in &calls {
                    let accepted = call.call_id == call_id
                        || (call.tool_name == SUBMIT_FINAL_ANSWER
                            && AgentTool::from_call(call).is_ok());
                    let msg = if accepted {
                        Message::tool_result(&call.call_id, prompts::ANSWER_ACCEPTED)
                    } else {
                        correction(call)
                    };
                    self.transcript.push(msg);
                }
                self.answer = Some(answer);
                Ok(Step::Done)
            }
            GenerationRoute::Correct => {
                for call in &calls {
                    tracing::debug!(tool = %call.tool_name, "tool called at generation");
                    self.transcript.push(correction(call));
                }
                Ok(Step::GenerateQuery)
            }
            GenerationRoute::Retry => Ok(Step::GenerateQuery),
            GenerationRoute::Check => Ok(Step::CheckQuery),
        }
    }

    async fn check(&mut self) -> Result<Step> {
        let query = self
            .transcript
            .last()
            .map(Message::text_content)
            .unwrap_or_default();
        // Chat APIs reject a request that ends on an assistant turn, so the
        // candidate query is posed as user text.
        let messages = vec![
            Message::system(prompts::QUERY_CHECK_SYSTEM),
            Message::user(query),
        ];
        let reply = self
            .complete(Step::CheckQuery, messages, tools::database_tools())
            .await?;
        self.transcript.push(reply);
        Ok(Step::ExecuteQuery)
    }

    async fn execute(&mut self) -> Step {
        let answered = self
            .answer_calls(&[LIST_TABLES, GET_SCHEMA, EXECUTE_QUERY], Step::ExecuteQuery)
            .await;
        if answered == 0 {
            tracing::warn!("check step requested no tool call");
        }
        Step::GenerateQuery
    }

    // ── helpers ──────────────────────────────────────────────────────

    /// Answer every tool call of the last message, in order.
    async fn answer_calls(&mut self, offered: &[&str], step: Step) -> usize {
        let calls = self
            .transcript
            .last()
            .map(Message::tool_calls)
            .unwrap_or_default();
        for call in &calls {
            let result =
                tools::dispatch(&self.session.database, call, offered, step.as_str()).await;
            self.transcript.push(result);
        }
        calls.len()
    }

    async fn complete(
        &self,
        step: Step,
        messages: Vec<Message>,
        tool_defs: Vec<ToolDefinition>,
    ) -> Result<Message> {
        let provider = &self.session.provider;
        let req = ChatRequest {
            messages,
            tools: tool_defs,
            temperature: Some(self.config.llm.temperature),
            max_tokens: None,
            model: None,
        };

        let started = Instant::now();
        let resp = provider
            .chat(&req)
            .instrument(tracing::debug_span!("llm.call", step = %step))
            .await?;

        TraceEvent::LlmRequest {
            provider: provider.provider_id().to_string(),
            model: if resp.model.is_empty() {
                provider.default_model().to_string()
            } else {
                resp.model.clone()
            },
            step: step.as_str().to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
            completion_tokens: resp.usage.map(|u| u.completion_tokens),
        }
        .emit();

        Ok(resp.into_message())
    }
}

/// Corrective result for a tool call made at generation that is not an
/// accepted final answer.
fn correction(call: &ToolCall) -> Message {
    let text = match AgentTool::from_call(call) {
        Err(fault) if call.tool_name == SUBMIT_FINAL_ANSWER => fault.corrective_text(),
        _ => prompts::wrong_tool(&call.tool_name),
    };
    Message::tool_error(&call.call_id, text)
}

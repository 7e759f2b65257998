mod common;

use std::sync::Arc;

use serde_json::json;

use sq_domain::config::Config;
use sq_domain::tool::{Message, Role};
use sq_gateway::runtime::tools::{
    EXECUTE_QUERY, GET_SCHEMA, LIST_TABLES, SUBMIT_FINAL_ANSWER,
};
use sq_gateway::runtime::{prompts, run_query, RunStatus, INIT_CALL_ID, SCHEMA_CALL_ID};
use sq_providers::ScriptedProvider;

fn tool_names(provider: &ScriptedProvider, request: usize) -> Vec<String> {
    provider.requests()[request]
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect()
}

fn tool_results(messages: &[Message]) -> Vec<(String, String)> {
    messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| {
            (
                m.tool_result_id().unwrap_or_default().to_string(),
                m.text_content(),
            )
        })
        .collect()
}

#[tokio::test]
async fn counts_rows_through_the_full_graph() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedProvider::tool_call("s1", GET_SCHEMA, json!({ "table_names": "T1" })),
        ScriptedProvider::text("SELECT count(*) FROM T1;"),
        ScriptedProvider::tool_call("q1", EXECUTE_QUERY, json!({ "query": "SELECT count(*) FROM T1;" })),
        ScriptedProvider::tool_call(
            "f1",
            SUBMIT_FINAL_ANSWER,
            json!({ "final_answer": "There are 2 rows in T1." }),
        ),
    ]));
    let (_dir, session) = common::session(provider.clone());

    let outcome = run_query(&session, "How many rows are in T1?", &Config::default())
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Success);
    assert!(outcome.answer.contains('2'));
    assert_eq!(outcome.rounds, 2);
    assert_eq!(provider.remaining(), 0);
    outcome.transcript.check_pairing().unwrap();

    let messages = outcome.transcript.messages();
    assert_eq!(messages[0].text_content(), "How many rows are in T1?");
    assert_eq!(messages[1].tool_calls()[0].call_id, INIT_CALL_ID);
    assert_eq!(messages[1].tool_calls()[0].tool_name, LIST_TABLES);

    let results = tool_results(messages);
    assert_eq!(results[0], (INIT_CALL_ID.to_string(), "T1, T2".to_string()));
    assert_eq!(results[1].0, "s1");
    assert!(results[1].1.contains("CREATE TABLE T1 ("));
    assert!(!results[1].1.contains("CREATE TABLE T2"));
    assert_eq!(results[2], ("q1".to_string(), "count(*)\n2\n".to_string()));
    assert_eq!(results[3], ("f1".to_string(), prompts::ANSWER_ACCEPTED.to_string()));

    // Step-specific tool offers.
    assert_eq!(tool_names(&provider, 0), vec![GET_SCHEMA]);
    assert_eq!(tool_names(&provider, 1), vec![SUBMIT_FINAL_ANSWER]);
    assert_eq!(
        tool_names(&provider, 2),
        vec![LIST_TABLES, GET_SCHEMA, EXECUTE_QUERY]
    );

    // The check step sees only the system prompt and the candidate query.
    let check = &provider.requests()[2];
    assert_eq!(check.messages.len(), 2);
    assert_eq!(check.messages[0].role, Role::System);
    assert_eq!(check.messages[1].text_content(), "SELECT count(*) FROM T1;");

    // Generation sees the system prompt plus the whole transcript.
    let generate = &provider.requests()[1];
    assert_eq!(generate.messages[0].role, Role::System);
    assert_eq!(generate.messages[1].text_content(), "How many rows are in T1?");
}

#[tokio::test]
async fn wrong_tool_at_generation_is_corrected_without_checking() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedProvider::text(""),
        ScriptedProvider::tool_call("w1", EXECUTE_QUERY, json!({ "query": "SELECT 1" })),
        ScriptedProvider::tool_call("f1", SUBMIT_FINAL_ANSWER, json!({ "final_answer": "done" })),
    ]));
    let (_dir, session) = common::session(provider.clone());

    let outcome = run_query(&session, "Anything?", &Config::default())
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.rounds, 2);
    // fetch_schema + two generations, no check step.
    assert_eq!(provider.requests().len(), 3);
    outcome.transcript.check_pairing().unwrap();

    let results = tool_results(outcome.transcript.messages());
    // No schema was requested, so every table is fetched.
    let (id, schema) = &results[1];
    assert_eq!(id, SCHEMA_CALL_ID);
    assert!(schema.contains("CREATE TABLE T1 ("));
    assert!(schema.contains("CREATE TABLE T2 ("));

    assert_eq!(results[2], ("w1".to_string(), prompts::wrong_tool(EXECUTE_QUERY)));

    // The second generation saw the corrective entry last.
    let retry = &provider.requests()[2];
    assert!(retry
        .messages
        .last()
        .unwrap()
        .text_content()
        .starts_with("Error: The wrong tool was called: execute_query."));
}

#[tokio::test]
async fn invalid_sql_error_reaches_the_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedProvider::tool_call("s1", GET_SCHEMA, json!({ "table_names": "T1" })),
        ScriptedProvider::text("SELECT nope FROM T1;"),
        ScriptedProvider::tool_call("q1", EXECUTE_QUERY, json!({ "query": "SELECT nope FROM T1;" })),
        ScriptedProvider::tool_call("f1", SUBMIT_FINAL_ANSWER, json!({ "final_answer": "unknown" })),
    ]));
    let (_dir, session) = common::session(provider.clone());

    let outcome = run_query(&session, "What is nope?", &Config::default())
        .await
        .unwrap();
    assert_eq!(outcome.status, RunStatus::Success);

    let fed_back = provider.requests()[3]
        .messages
        .last()
        .unwrap()
        .text_content();
    assert!(fed_back.starts_with("Error: "));
    assert!(fed_back.contains("no such column: nope"));
    assert!(fed_back.ends_with(". Please rewrite your query and try again."));
}

#[tokio::test]
async fn final_answer_at_check_step_is_a_tool_fault() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedProvider::tool_call("s1", GET_SCHEMA, json!({ "table_names": "T1" })),
        ScriptedProvider::text("SELECT name FROM T1;"),
        ScriptedProvider::tool_call("c1", SUBMIT_FINAL_ANSWER, json!({ "final_answer": "alpha" })),
        ScriptedProvider::tool_call("f1", SUBMIT_FINAL_ANSWER, json!({ "final_answer": "alpha, beta" })),
    ]));
    let (_dir, session) = common::session(provider.clone());

    let outcome = run_query(&session, "Names?", &Config::default())
        .await
        .unwrap();
    assert_eq!(outcome.answer, "alpha, beta");
    outcome.transcript.check_pairing().unwrap();

    let results = tool_results(outcome.transcript.messages());
    let (_, fault) = results.iter().find(|(id, _)| id == "c1").unwrap();
    assert!(fault.starts_with("Error: "));
    assert!(fault.ends_with("\nplease fix your mistakes."));
}

#[tokio::test]
async fn round_cap_ends_the_run_without_an_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ScriptedProvider::text("I will look at every table."),
        ScriptedProvider::text("Error: I cannot answer that."),
        ScriptedProvider::text("Error: still cannot answer."),
    ]));
    let (_dir, session) = common::session(provider.clone());

    let mut config = Config::default();
    config.agent.max_generation_rounds = 2;

    let outcome = run_query(&session, "Unanswerable?", &config).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Error);
    assert_eq!(outcome.answer, "Failed to generate an answer.");
    assert_eq!(outcome.rounds, 2);
    assert_eq!(provider.remaining(), 0);
    outcome.transcript.check_pairing().unwrap();
}

#[tokio::test]
async fn provider_failure_aborts_the_run() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let (_dir, session) = common::session(provider);

    let err = run_query(&session, "Anything?", &Config::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("script exhausted"));
}

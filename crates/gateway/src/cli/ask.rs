//! `sqlagent ask` — one-shot question against a local database file.
//!
//! Opens the file in place (no upload copy), runs the agent once and
//! prints the answer. The file is opened read-only unless `--allow-writes`
//! is given.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use sq_domain::config::Config;
use sq_sessions::Session;
use sq_tools::{DatabaseOptions, SqliteDatabase};

use crate::runtime::{self, RunStatus};

#[derive(Debug, Default)]
pub struct AskOptions {
    pub api_key: Option<String>,
    pub json_output: bool,
    pub allow_writes: bool,
}

/// Executor options for a file the user owns.
pub fn database_options(config: &Config, allow_writes: bool) -> DatabaseOptions {
    let mut options = DatabaseOptions::from(&config.database);
    options.read_only |= !allow_writes;
    options
}

pub async fn ask(
    config: Arc<Config>,
    database: PathBuf,
    question: String,
    opts: AskOptions,
) -> anyhow::Result<()> {
    // 1. Open the database and read its tables.
    let options = database_options(&config, opts.allow_writes);
    let path = database.clone();
    let (db, tables) = tokio::task::spawn_blocking(move || {
        let db = SqliteDatabase::open(&path, options)?;
        let tables = db.table_names()?;
        Ok::<_, sq_tools::DatabaseError>((db, tables))
    })
    .await?
    .with_context(|| format!("opening {}", database.display()))?;

    // 2. Build the provider.
    let key = sq_providers::util::resolve_api_key(&config.llm.provider.auth, opts.api_key.as_deref())
        .context("resolving provider credential")?;
    let provider = sq_providers::create_provider(&config.llm, key).context("creating provider")?;

    let file_name = database
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let session = Session::new(file_name, db, provider, tables, None);

    // 3. Run and print.
    let outcome = runtime::run_query(&session, &question, &config)
        .await
        .context("agent run failed")?;

    if opts.json_output {
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| anyhow::anyhow!("serializing outcome: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", outcome.answer);
    }

    if outcome.status == RunStatus::Error {
        std::process::exit(1);
    }

    Ok(())
}

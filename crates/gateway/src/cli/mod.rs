pub mod ask;
pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// sqlagent — ask questions about a SQLite database in plain language.
#[derive(Debug, Parser)]
#[command(name = "sqlagent", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Ask a single question about a local database file and print the answer.
    Ask {
        /// Path to the SQLite database.
        #[arg(long, short)]
        database: PathBuf,
        /// The question to answer.
        question: String,
        /// Provider API key (defaults to the configured env var).
        #[arg(long)]
        api_key: Option<String>,
        /// Output the full outcome, transcript included, as JSON.
        #[arg(long)]
        json: bool,
        /// Let the agent's statements modify the file.
        #[arg(long)]
        allow_writes: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `SQ_CONFIG` (or
/// `config.toml` by default). Returns the parsed config and the path that
/// was used. A missing file yields the defaults.
pub fn load_config() -> anyhow::Result<(sq_domain::config::Config, String)> {
    let config_path = std::env::var("SQ_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

fn load_config_from(config_path: &str) -> anyhow::Result<sq_domain::config::Config> {
    if std::path::Path::new(config_path).exists() {
        let raw = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
    } else {
        Ok(sq_domain::config::Config::default())
    }
}

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sq_domain::config::{Config, CorsConfig};
use sq_gateway::api;
use sq_gateway::bootstrap;
use sq_gateway::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, _config_path) = sq_gateway::cli::load_config()?;
            init_tracing();
            run_server(Arc::new(config)).await
        }
        Some(Command::Ask {
            database,
            question,
            api_key,
            json,
            allow_writes,
        }) => {
            init_cli_tracing();
            let (config, _) = sq_gateway::cli::load_config()?;
            let opts = sq_gateway::cli::ask::AskOptions {
                api_key,
                json_output: json,
                allow_writes,
            };
            sq_gateway::cli::ask::ask(Arc::new(config), database, question, opts).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = sq_gateway::cli::load_config()?;
            let valid = sq_gateway::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = sq_gateway::cli::load_config()?;
            sq_gateway::cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("sqlagent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured JSON tracing (only for the `serve` command).
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sq_gateway=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Initialize compact stderr-only tracing for CLI one-shot commands.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Start the HTTP server with the given configuration.
async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("sqlagent starting");

    // ── Build shared state & spawn background loops ──────────────────
    let state = bootstrap::build_app_state(config.clone())?;
    bootstrap::spawn_background_tasks(&state);

    // ── CORS layer (config-aware) ────────────────────────────────────
    let cors_layer = build_cors_layer(&config.server.cors);

    // ── Concurrency limit (backpressure protection) ────────────────
    let max_concurrent = config.server.max_concurrent_requests;
    tracing::info!(max_concurrent, "concurrency limit set");

    // ── Router ───────────────────────────────────────────────────────
    let app = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state.clone());

    // ── Bind ─────────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "sqlagent listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server error")?;

    // Dropping the sessions removes their temp directories.
    let open = state.sessions.len();
    for summary in state.sessions.list() {
        state.sessions.remove(&summary.session_id);
    }
    tracing::info!(sessions_closed = open, "shutdown complete");

    Ok(())
}

/// Wait for SIGINT or SIGTERM, then return to trigger graceful shutdown of
/// the Axum server.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// Origins may contain a trailing `*` wildcard for the port segment
/// (e.g. `http://localhost:*`). These are expanded into a predicate that
/// matches any port on that host. A literal `"*"` allows all origins.
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    use axum::http::header;

    // Note: allow_credentials is incompatible with wildcard origins.
    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    }

    // Partition into exact origins and wildcard-port patterns.
    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if origin.ends_with(":*") {
            wildcard_prefixes.push(origin.trim_end_matches('*').to_owned());
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .map(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
                    .unwrap_or(false)
            })
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

use sq_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn empty_file_yields_defaults_for_every_section() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.database.sample_rows, 15);
    assert!(!config.database.read_only);
    assert_eq!(config.database.busy_timeout_ms, 5000);
    assert_eq!(config.agent.max_generation_rounds, 10);
    assert_eq!(config.sessions.max_sessions, 32);
    assert_eq!(config.llm.provider.auth.env.as_deref(), Some("GROQ_API_KEY"));
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9000

[server.cors]
allowed_origins = ["https://myapp.com", "http://localhost:3000"]

[llm]
temperature = 0.1
timeout_ms = 30000

[llm.provider]
id = "local"
kind = "openai_compat"
base_url = "http://localhost:11434/v1"
default_model = "llama3"

[llm.provider.auth]
env = "LOCAL_KEY"

[database]
sample_rows = 3
read_only = true

[agent]
max_generation_rounds = 4

[sessions]
idle_ttl_secs = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
    assert_eq!(config.llm.provider.id, "local");
    assert_eq!(config.llm.provider.default_model.as_deref(), Some("llama3"));
    assert_eq!(config.llm.provider.auth.env.as_deref(), Some("LOCAL_KEY"));
    assert_eq!(config.llm.timeout_ms, 30_000);
    assert_eq!(config.database.sample_rows, 3);
    assert!(config.database.read_only);
    assert_eq!(config.database.busy_timeout_ms, 5000);
    assert_eq!(config.agent.max_generation_rounds, 4);
    assert_eq!(config.sessions.idle_ttl_secs, 0);
    assert_eq!(config.sessions.prune_interval_secs, 60);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn api_token_env_default() {
    let config = Config::default();
    assert_eq!(config.server.api_token_env, "SQ_API_TOKEN");
}

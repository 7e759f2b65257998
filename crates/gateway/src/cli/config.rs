use sq_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!(
        "\n{} error(s), {} warning(s) in {config_path}",
        error_count, warning_count,
    );

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) {
    match render(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}

fn render(config: &Config) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_defaults_parse_back() {
        let text = render(&Config::default()).unwrap();
        assert!(text.contains("[llm.provider]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, 8000);
        assert_eq!(parsed.agent.max_generation_rounds, 10);
    }

    #[test]
    fn invalid_config_fails_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(!validate(&config, "test.toml"));
        assert!(validate(&Config::default(), "test.toml"));
    }
}

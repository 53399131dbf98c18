//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ConfigViolation};
use crate::routing::RouteError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ConfigViolation>),

    #[error("Route table rejected: {0}")]
    Routes(#[from] RouteError),
}

fn join(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write(
            r#"
            [listener]
            bind_address = "0.0.0.0:3000"

            [[routes]]
            name = "members"
            pattern = "members/{user}"
            defaults = { controller = "TestRouteConstraint", action = "Match" }
            constraints = [{ kind = "regex", parameter = "user", pattern = "[a-z]+" }]
            "#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.routes.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let file = write("[listener\nbind_address = 1");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_semantic_errors_are_all_reported() {
        let file = write(
            r#"
            [listener]
            max_body_bytes = 0

            [timeouts]
            request_secs = 0
            "#,
        );
        match load_config(file.path()) {
            Err(ConfigError::Validation(violations)) => {
                assert_eq!(violations.len(), 2);
                let message = ConfigError::Validation(violations).to_string();
                assert!(message.contains("max_body_bytes"));
                assert!(message.contains("request_secs"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}

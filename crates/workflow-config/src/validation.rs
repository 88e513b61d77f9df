// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks constraints serde cannot express. All problems are collected so a
//! single run reports every mistake in the file.

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::WorkflowConfig;

/// Levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
pub fn validate_config(config: &WorkflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let db = &config.database;

    if let Err(e) = db.backend() {
        errors.push(e);
    }
    if let Err(e) = db.path() {
        errors.push(e);
    }

    if db.migrations_path.trim().is_empty() {
        errors.push(invalid("database.migrations_path", "must not be empty"));
    }

    if db.max_open_conns == 0 {
        errors.push(invalid("database.max_open_conns", "must be at least 1"));
    }

    if db.max_idle_conns > db.max_open_conns {
        errors.push(invalid(
            "database.max_idle_conns",
            format!(
                "{} exceeds max_open_conns ({})",
                db.max_idle_conns, db.max_open_conns
            ),
        ));
    }

    if db.conn_max_lifetime_secs == 0 {
        errors.push(invalid("database.conn_max_lifetime_secs", "must be at least 1"));
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::InvalidValue {
            key: "logging.level".to_string(),
            message: format!(
                "`{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
            suggestion: suggest_key(&level, LOG_LEVELS),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
        suggestion: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatabaseConfig, LoggingConfig};

    fn sqlite() -> WorkflowConfig {
        WorkflowConfig {
            database: DatabaseConfig::sqlite("/tmp/workflow.db"),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn minimal_sqlite_config_is_valid() {
        assert!(validate_config(&sqlite()).is_ok());
    }

    #[test]
    fn defaults_alone_are_invalid() {
        let errors = validate_config(&WorkflowConfig::default()).unwrap_err();
        let keys: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(errors.len(), 2, "{keys:?}");
        assert!(keys.iter().any(|k| k.contains("database.type")));
        assert!(keys.iter().any(|k| k.contains("database.path")));
    }

    #[test]
    fn unknown_backend_is_reported() {
        let mut config = sqlite();
        config.database.backend = Some("oracle".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(&errors[..], [ConfigError::UnknownBackend { value }] if value == "oracle"));
    }

    #[test]
    fn pool_bounds_are_checked_together() {
        let mut config = sqlite();
        config.database.max_open_conns = 0;
        config.database.max_idle_conns = 5;
        config.database.conn_max_lifetime_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn misspelled_log_level_gets_a_suggestion() {
        let mut config = sqlite();
        config.logging.level = "warnn".into();
        let errors = validate_config(&config).unwrap_err();
        match &errors[..] {
            [ConfigError::InvalidValue { suggestion, .. }] => {
                assert_eq!(suggestion.as_deref(), Some("warn"));
            }
            other => panic!("unexpected errors: {other:?}"),
        }
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = sqlite();
        config.logging.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn postgres_file_with_pool_settings_is_valid() {
        let toml_str = r#"
            [database]
            type = "postgres"
            path = "postgres://localhost/workflow"
            max_open_conns = 10
            max_idle_conns = 2

            [logging]
            level = "debug"
        "#;
        let config: WorkflowConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn idle_pool_larger_than_open_pool_is_rejected() {
        let toml_str = r#"
            [database]
            type = "postgres"
            path = "postgres://localhost/workflow"
            max_open_conns = 2
            max_idle_conns = 5
        "#;
        let config: WorkflowConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("database.max_idle_conns"));
    }
}

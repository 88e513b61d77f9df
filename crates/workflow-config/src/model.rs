// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::diagnostic::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Storage backend and pool settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Process logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The storage engines a store can be opened against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    /// Embedded, file-backed.
    Sqlite,
    /// Networked server.
    Postgres,
}

impl BackendKind {
    /// Name of the migration subdirectory holding this backend's scripts.
    pub fn dialect(&self) -> &'static str {
        (*self).into()
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `"sqlite"` or `"postgres"`. Required.
    #[serde(rename = "type", default)]
    pub backend: Option<String>,

    /// SQLite file path or Postgres connection URL. Required.
    #[serde(default)]
    pub path: Option<String>,

    /// Directory holding one subdirectory of migration scripts per backend.
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Upper bound on pooled connections.
    #[serde(default = "default_max_open_conns")]
    pub max_open_conns: u32,

    /// Idle connections kept after a health check trims the pool.
    #[serde(default = "default_max_idle_conns")]
    pub max_idle_conns: u32,

    /// Connections older than this are discarded instead of reused.
    #[serde(default = "default_conn_max_lifetime_secs")]
    pub conn_max_lifetime_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: None,
            path: None,
            migrations_path: default_migrations_path(),
            max_open_conns: default_max_open_conns(),
            max_idle_conns: default_max_idle_conns(),
            conn_max_lifetime_secs: default_conn_max_lifetime_secs(),
        }
    }
}

impl DatabaseConfig {
    /// SQLite settings for the file at `path`.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: Some(BackendKind::Sqlite.to_string()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Postgres settings for the server at `url`.
    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            backend: Some(BackendKind::Postgres.to_string()),
            path: Some(url.into()),
            ..Self::default()
        }
    }

    /// The configured backend.
    pub fn backend(&self) -> Result<BackendKind, ConfigError> {
        let raw = self
            .backend
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                key: "database.type".to_string(),
            })?;
        raw.parse().map_err(|_| ConfigError::UnknownBackend {
            value: raw.to_string(),
        })
    }

    /// The configured file path or connection URL.
    pub fn path(&self) -> Result<&str, ConfigError> {
        match self.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(ConfigError::MissingKey {
                key: "database.path".to_string(),
            }),
        }
    }

    pub fn conn_max_lifetime(&self) -> Duration {
        Duration::from_secs(self.conn_max_lifetime_secs)
    }
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_max_open_conns() -> u32 {
    25
}

fn default_max_idle_conns() -> u32 {
    25
}

fn default_conn_max_lifetime_secs() -> u64 {
    300
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default tracing level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_defaults() {
        let db = DatabaseConfig::default();
        assert_eq!(db.max_open_conns, 25);
        assert_eq!(db.max_idle_conns, 25);
        assert_eq!(db.conn_max_lifetime(), Duration::from_secs(300));
        assert_eq!(db.migrations_path, "migrations");
    }

    #[test]
    fn backend_parses_known_types() {
        assert_eq!(
            DatabaseConfig::sqlite("/tmp/a.db").backend().unwrap(),
            BackendKind::Sqlite
        );
        assert_eq!(
            DatabaseConfig::postgres("postgres://localhost/wf").backend().unwrap(),
            BackendKind::Postgres
        );
        assert_eq!(BackendKind::Postgres.dialect(), "postgres");
    }

    #[test]
    fn backend_rejects_missing_and_unknown_types() {
        let missing = DatabaseConfig::default();
        assert!(matches!(
            missing.backend(),
            Err(ConfigError::MissingKey { .. })
        ));

        let unknown = DatabaseConfig {
            backend: Some("mysql".into()),
            ..DatabaseConfig::default()
        };
        let err = unknown.backend().unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"unknown database type "mysql" (expected "sqlite" or "postgres")"#
        );
    }

    #[test]
    fn blank_path_counts_as_missing() {
        let db = DatabaseConfig {
            path: Some("  ".into()),
            ..DatabaseConfig::sqlite("x")
        };
        assert!(db.path().is_err());
    }
}

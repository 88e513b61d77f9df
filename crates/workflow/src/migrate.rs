// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `workflow migrate` and `workflow check` implementations.

use std::io::IsTerminal;

use serde::Serialize;
use tracing::info;
use workflow_config::DatabaseConfig;
use workflow_core::{Context, WorkflowError};
use workflow_storage::{MigrationStatus, Store};

/// Structured row for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusRow {
    pub version: i64,
    pub name: String,
    pub applied: bool,
    pub applied_at: Option<String>,
}

impl From<&MigrationStatus> for StatusRow {
    fn from(status: &MigrationStatus) -> Self {
        Self {
            version: status.version,
            name: status.name.clone(),
            applied: status.is_applied(),
            applied_at: status.applied_at.map(|at| at.to_rfc3339()),
        }
    }
}

async fn open(config: &DatabaseConfig) -> Result<Store, WorkflowError> {
    let store = Store::open(config).await?;
    info!(backend = %store.kind(), "database opened");
    Ok(store)
}

pub async fn run_up(config: &DatabaseConfig) -> Result<(), WorkflowError> {
    let store = open(config).await?;
    let report = store.migrate_up(&Context::background()).await;
    store.close().await?;
    println!("{}", render_report(&report?.applied, "applied"));
    Ok(())
}

pub async fn run_down(config: &DatabaseConfig) -> Result<(), WorkflowError> {
    let store = open(config).await?;
    let report = store.rollback_one(&Context::background()).await;
    store.close().await?;
    println!("{}", render_report(&report?.reverted, "reverted"));
    Ok(())
}

pub async fn run_status(
    config: &DatabaseConfig,
    json: bool,
    plain: bool,
) -> Result<(), WorkflowError> {
    let store = open(config).await?;
    let status = store.migration_status(&Context::background()).await;
    store.close().await?;
    let status = status?;

    if json {
        let rows: Vec<StatusRow> = status.iter().map(StatusRow::from).collect();
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| WorkflowError::storage("failed to encode status", e))?;
        println!("{out}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_status(&status, use_color));
    }
    Ok(())
}

pub async fn run_check(config: &DatabaseConfig) -> Result<(), WorkflowError> {
    let store = open(config).await?;
    let result = store.health_check(&Context::background()).await;
    store.close().await?;
    result?;
    println!("database ok ({})", store.kind());
    Ok(())
}

fn render_report(steps: &[(i64, String)], verb: &str) -> String {
    if steps.is_empty() {
        return "nothing to do".to_string();
    }
    steps
        .iter()
        .map(|(version, name)| format!("{verb} {version:03}_{name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_status(status: &[MigrationStatus], use_color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("  workflow migrate status\n");
    out.push_str(&format!("  {}\n", "-".repeat(50)));

    if status.is_empty() {
        out.push_str("    no migrations found\n");
    }
    for entry in status {
        let label = format!("{:03}_{}", entry.version, entry.name);
        let line = match (entry.applied_at, use_color) {
            (Some(at), true) => {
                use colored::Colorize;
                format!("    {} {label:<30} {}", "✓".green(), at.to_rfc3339())
            }
            (Some(at), false) => format!("    [UP]   {label:<30} {}", at.to_rfc3339()),
            (None, true) => {
                use colored::Colorize;
                format!("    {} {label:<30} {}", "·".yellow(), "pending".yellow())
            }
            (None, false) => format!("    [DOWN] {label:<30} pending"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use workflow_storage::MigrationReport;

    use super::*;

    fn sample() -> Vec<MigrationStatus> {
        vec![
            MigrationStatus {
                version: 1,
                name: "initial_schema".into(),
                applied_at: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            },
            MigrationStatus {
                version: 2,
                name: "indexes".into(),
                applied_at: None,
            },
        ]
    }

    #[test]
    fn plain_status_marks_applied_and_pending() {
        let out = render_status(&sample(), false);
        assert!(out.contains("[UP]   001_initial_schema"));
        assert!(out.contains("2026-01-02T03:04:05+00:00"));
        assert!(out.contains("[DOWN] 002_indexes"));
        assert!(out.contains("pending"));
    }

    #[test]
    fn empty_status_says_so() {
        assert!(render_status(&[], false).contains("no migrations found"));
    }

    #[test]
    fn json_rows_carry_applied_flag() {
        let rows: Vec<StatusRow> = sample().iter().map(StatusRow::from).collect();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["applied"], true);
        assert_eq!(json[1]["applied"], false);
        assert!(json[1]["applied_at"].is_null());
    }

    #[test]
    fn report_lists_each_step() {
        let report = MigrationReport {
            applied: vec![(1, "initial_schema".into()), (2, "indexes".into())],
            reverted: vec![],
        };
        assert_eq!(
            render_report(&report.applied, "applied"),
            "applied 001_initial_schema\napplied 002_indexes"
        );
        assert_eq!(render_report(&report.reverted, "reverted"), "nothing to do");
    }

    #[tokio::test]
    async fn commands_run_against_a_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.db");
        let mut config = DatabaseConfig::sqlite(path.to_string_lossy());
        config.migrations_path = workflow_storage::bundled_migrations_dir()
            .to_string_lossy()
            .into_owned();

        run_up(&config).await.unwrap();
        run_status(&config, true, true).await.unwrap();
        run_check(&config).await.unwrap();
        run_down(&config).await.unwrap();

        let store = Store::open(&config).await.unwrap();
        let status = store.migration_status(&Context::background()).await.unwrap();
        assert!(status[0].is_applied());
        assert!(!status[1].is_applied());
    }
}

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned, reversible schema migrations.
//!
//! Scripts live in `<base>/<dialect>/` as `NNN_name.up.sql` and
//! `NNN_name.down.sql`. Applied versions are recorded in `schema_migrations`
//! together with the dialect that applied them, and each script runs in the
//! same transaction as its bookkeeping row.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use workflow_config::BackendKind;
use workflow_core::{Context, WorkflowError, clock};

use crate::mappers::{format_timestamp, parse_timestamp};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// One version with both directions loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub down_sql: String,
}

/// A row of `schema_migrations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub dialect: String,
    pub applied_at: String,
}

/// Per-version state reported by [`MigrationRunner::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub name: String,
    pub applied_at: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Outcome of a migration run. An empty report is a successful no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// `(version, name)` applied, in order.
    pub applied: Vec<(i64, String)>,
    /// `(version, name)` reverted, in order.
    pub reverted: Vec<(i64, String)>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.reverted.is_empty()
    }
}

/// Backend hooks the runner drives. Each call is atomic on the backend.
#[async_trait]
pub trait MigrationTarget: Send + Sync {
    async fn ensure_migrations_table(&self) -> Result<(), WorkflowError>;

    /// Applied rows ordered by version.
    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>, WorkflowError>;

    /// Runs `up_sql` and records the version in one transaction.
    async fn apply_migration(
        &self,
        migration: &Migration,
        dialect: &'static str,
        applied_at: String,
    ) -> Result<(), WorkflowError>;

    /// Runs `down_sql` and removes the version row in one transaction.
    async fn revert_migration(&self, migration: &Migration) -> Result<(), WorkflowError>;
}

/// Loads the scripts for one dialect and applies them to a [`MigrationTarget`].
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    dir: PathBuf,
    backend: BackendKind,
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    /// Reads and validates the scripts under `base_dir` for `backend`.
    ///
    /// `base_dir` may be the parent of the dialect directories or a dialect
    /// directory itself; in the latter case it must match `backend`.
    pub fn new(base_dir: impl AsRef<Path>, backend: BackendKind) -> Result<Self, WorkflowError> {
        let dir = resolve_dialect_dir(base_dir.as_ref(), backend)?;
        let migrations = load_migrations(&dir)?;
        debug!(dir = %dir.display(), count = migrations.len(), "loaded migrations");
        Ok(Self {
            dir,
            backend,
            migrations,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Loaded migrations ordered by version.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Applies every pending version in ascending order.
    pub async fn migrate_up(
        &self,
        ctx: &Context,
        target: &dyn MigrationTarget,
    ) -> Result<MigrationReport, WorkflowError> {
        let applied = self.prepare(ctx, target).await?;
        let applied_versions: BTreeSet<i64> = applied.iter().map(|m| m.version).collect();

        if let Some(unknown) = applied_versions
            .iter()
            .find(|v| !self.migrations.iter().any(|m| m.version == **v))
        {
            return Err(WorkflowError::migration(
                Some(*unknown),
                format!(
                    "database records version {unknown}, which has no script in {}",
                    self.dir.display()
                ),
            ));
        }

        let mut report = MigrationReport::default();
        for migration in &self.migrations {
            if applied_versions.contains(&migration.version) {
                continue;
            }
            // A started step is awaited to completion so the report matches
            // what the backend committed.
            ctx.check()?;
            let applied_at = format_timestamp(clock::now());
            target
                .apply_migration(migration, self.backend.dialect(), applied_at)
                .await?;
            info!(
                version = migration.version,
                name = %migration.name,
                dialect = self.backend.dialect(),
                "migration applied"
            );
            report
                .applied
                .push((migration.version, migration.name.clone()));
        }

        if report.is_noop() {
            info!(dialect = self.backend.dialect(), "schema is up to date");
        }
        Ok(report)
    }

    /// Reverts the most recently applied version, if any.
    pub async fn rollback_one(
        &self,
        ctx: &Context,
        target: &dyn MigrationTarget,
    ) -> Result<MigrationReport, WorkflowError> {
        let applied = self.prepare(ctx, target).await?;
        let mut report = MigrationReport::default();

        let Some(latest) = applied.iter().map(|m| m.version).max() else {
            info!(dialect = self.backend.dialect(), "nothing to roll back");
            return Ok(report);
        };
        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == latest)
            .ok_or_else(|| {
                WorkflowError::migration(
                    Some(latest),
                    format!("no down script for applied version {latest}"),
                )
            })?;

        ctx.check()?;
        target.revert_migration(migration).await?;
        info!(
            version = migration.version,
            name = %migration.name,
            dialect = self.backend.dialect(),
            "migration reverted"
        );
        report
            .reverted
            .push((migration.version, migration.name.clone()));
        Ok(report)
    }

    /// Every loaded version with its applied time, if applied.
    pub async fn status(
        &self,
        ctx: &Context,
        target: &dyn MigrationTarget,
    ) -> Result<Vec<MigrationStatus>, WorkflowError> {
        let applied = self.prepare(ctx, target).await?;
        let applied_at: BTreeMap<i64, &str> = applied
            .iter()
            .map(|m| (m.version, m.applied_at.as_str()))
            .collect();

        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                version: m.version,
                name: m.name.clone(),
                applied_at: applied_at.get(&m.version).map(|ts| parse_timestamp(ts)),
            })
            .collect())
    }

    /// Ensures the bookkeeping table and refuses rows from another dialect.
    async fn prepare(
        &self,
        ctx: &Context,
        target: &dyn MigrationTarget,
    ) -> Result<Vec<AppliedMigration>, WorkflowError> {
        ctx.run(target.ensure_migrations_table()).await?;
        let applied = ctx.run(target.applied_migrations()).await?;
        let dialect = self.backend.dialect();
        if let Some(foreign) = applied.iter().find(|m| m.dialect != dialect) {
            return Err(WorkflowError::migration(
                Some(foreign.version),
                format!(
                    "version {} was applied by the {} dialect; refusing to run {dialect} migrations",
                    foreign.version, foreign.dialect
                ),
            ));
        }
        Ok(applied)
    }
}

/// Picks `<base>/<dialect>`, or `base` itself when it already names a dialect.
fn resolve_dialect_dir(base: &Path, backend: BackendKind) -> Result<PathBuf, WorkflowError> {
    let wanted = backend.dialect();
    let named = base
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.parse::<BackendKind>().ok());

    let dir = match named {
        Some(kind) if kind == backend => base.to_path_buf(),
        Some(kind) => {
            return Err(WorkflowError::Config(format!(
                "migrations directory {} holds {} scripts but the database is {wanted}",
                base.display(),
                kind.dialect()
            )));
        }
        None => base.join(wanted),
    };

    if !dir.is_dir() {
        return Err(WorkflowError::Config(format!(
            "migrations directory {} does not exist",
            dir.display()
        )));
    }
    Ok(dir)
}

#[derive(Default)]
struct Pair {
    name: String,
    up: Option<String>,
    down: Option<String>,
}

fn load_migrations(dir: &Path) -> Result<Vec<Migration>, WorkflowError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        WorkflowError::migration(None, format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut pairs: BTreeMap<i64, Pair> = BTreeMap::new();
    for entry in entries {
        let path = entry
            .map_err(|e| {
                WorkflowError::migration(None, format!("cannot list {}: {e}", dir.display()))
            })?
            .path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let (stem, is_up) = if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
            (stem, true)
        } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
            (stem, false)
        } else {
            continue;
        };

        let (version, name) = parse_stem(stem).ok_or_else(|| {
            WorkflowError::migration(None, format!("bad migration file name `{file_name}`"))
        })?;
        let sql = std::fs::read_to_string(&path).map_err(|e| {
            WorkflowError::migration(Some(version), format!("cannot read {}: {e}", path.display()))
        })?;

        let pair = pairs.entry(version).or_insert_with(|| Pair {
            name: name.to_string(),
            ..Pair::default()
        });
        let slot = if is_up { &mut pair.up } else { &mut pair.down };
        if pair.name != name || slot.is_some() {
            return Err(WorkflowError::migration(
                Some(version),
                format!("duplicate migration version {version} (`{file_name}`)"),
            ));
        }
        *slot = Some(sql);
    }

    pairs
        .into_iter()
        .map(|(version, pair)| match (pair.up, pair.down) {
            (Some(up_sql), Some(down_sql)) => Ok(Migration {
                version,
                name: pair.name,
                up_sql,
                down_sql,
            }),
            (Some(_), None) => Err(WorkflowError::migration(
                Some(version),
                format!("version {version} has no down script"),
            )),
            (None, _) => Err(WorkflowError::migration(
                Some(version),
                format!("version {version} has no up script"),
            )),
        })
        .collect()
}

/// Splits `001_initial_schema` into `(1, "initial_schema")`.
fn parse_stem(stem: &str) -> Option<(i64, &str)> {
    let (digits, name) = stem.split_once('_')?;
    if digits.is_empty() || name.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteDatabase;

    fn write(dir: &Path, name: &str, sql: &str) {
        std::fs::write(dir.join(name), sql).unwrap();
    }

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("sqlite");
        std::fs::create_dir(&dir).unwrap();
        (tmp, dir)
    }

    fn two_versions(dir: &Path) {
        write(dir, "001_things.up.sql", "CREATE TABLE things (id TEXT PRIMARY KEY);");
        write(dir, "001_things.down.sql", "DROP TABLE things;");
        write(dir, "002_more.up.sql", "CREATE TABLE more_things (id TEXT PRIMARY KEY);");
        write(dir, "002_more.down.sql", "DROP TABLE more_things;");
    }

    #[test]
    fn parses_file_stems() {
        assert_eq!(parse_stem("001_initial_schema"), Some((1, "initial_schema")));
        assert_eq!(parse_stem("12_x"), Some((12, "x")));
        assert_eq!(parse_stem("abc_x"), None);
        assert_eq!(parse_stem("001"), None);
        assert_eq!(parse_stem("001_"), None);
    }

    #[test]
    fn loads_sorted_pairs_and_ignores_other_files() {
        let (tmp, dir) = scratch();
        two_versions(&dir);
        write(&dir, "README.md", "notes");
        let runner = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap();
        let versions: Vec<i64> = runner.migrations().iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(runner.migrations()[0].name, "things");
    }

    #[test]
    fn missing_down_script_is_rejected() {
        let (tmp, dir) = scratch();
        write(&dir, "001_things.up.sql", "SELECT 1;");
        let err = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap_err();
        assert!(err.to_string().contains("no down script"), "{err}");
    }

    #[test]
    fn duplicate_versions_are_rejected() {
        let (tmp, dir) = scratch();
        two_versions(&dir);
        write(&dir, "001_other.up.sql", "SELECT 1;");
        let err = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn dialect_directory_must_match_backend() {
        let (_tmp, dir) = scratch();
        two_versions(&dir);
        assert!(MigrationRunner::new(&dir, BackendKind::Sqlite).is_ok());
        let err = MigrationRunner::new(&dir, BackendKind::Postgres).unwrap_err();
        assert_eq!(err.kind(), workflow_core::ErrorKind::Config);
    }

    #[test]
    fn missing_directory_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = MigrationRunner::new(tmp.path(), BackendKind::Postgres).unwrap_err();
        assert_eq!(err.kind(), workflow_core::ErrorKind::Config);
    }

    #[tokio::test]
    async fn up_then_noop_then_rollback() {
        let (tmp, dir) = scratch();
        two_versions(&dir);
        let runner = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap();
        let db = SqliteDatabase::open(":memory:").await.unwrap();
        let ctx = Context::background();

        let report = runner.migrate_up(&ctx, &db).await.unwrap();
        assert_eq!(report.applied, vec![(1, "things".into()), (2, "more".into())]);
        assert!(runner.migrate_up(&ctx, &db).await.unwrap().is_noop());

        let report = runner.rollback_one(&ctx, &db).await.unwrap();
        assert_eq!(report.reverted, vec![(2, "more".into())]);

        let status = runner.status(&ctx, &db).await.unwrap();
        assert!(status[0].is_applied());
        assert!(!status[1].is_applied());

        runner.rollback_one(&ctx, &db).await.unwrap();
        assert!(runner.rollback_one(&ctx, &db).await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn failed_script_leaves_version_unrecorded() {
        let (tmp, dir) = scratch();
        write(&dir, "001_bad.up.sql", "CREATE TABLE ok (id TEXT); NOT SQL AT ALL;");
        write(&dir, "001_bad.down.sql", "DROP TABLE ok;");
        let runner = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap();
        let db = SqliteDatabase::open(":memory:").await.unwrap();
        let ctx = Context::background();

        let err = runner.migrate_up(&ctx, &db).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Migration { version: Some(1), .. }));
        let status = runner.status(&ctx, &db).await.unwrap();
        assert!(!status[0].is_applied());
    }

    #[tokio::test]
    async fn rows_from_another_dialect_abort() {
        let (tmp, dir) = scratch();
        two_versions(&dir);
        let runner = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap();
        let db = SqliteDatabase::open(":memory:").await.unwrap();
        let ctx = Context::background();

        db.ensure_migrations_table().await.unwrap();
        db.call(&ctx, "migration", |conn| {
            conn.execute(
                "INSERT INTO schema_migrations \
                 VALUES (1, 'things', 'postgres', '2026-01-01T00:00:00Z')",
                [],
            )
        })
        .await
        .unwrap();

        let err = runner.migrate_up(&ctx, &db).await.unwrap_err();
        assert!(err.to_string().contains("postgres"), "{err}");
    }

    #[tokio::test]
    async fn cancelled_context_applies_nothing() {
        let (tmp, dir) = scratch();
        two_versions(&dir);
        let runner = MigrationRunner::new(tmp.path(), BackendKind::Sqlite).unwrap();
        let db = SqliteDatabase::open(":memory:").await.unwrap();
        let ctx = Context::background();
        ctx.cancel();
        assert!(runner.migrate_up(&ctx, &db).await.unwrap_err().is_cancellation());
    }
}

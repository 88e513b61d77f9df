// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded SQLite backend.
//!
//! A single [`tokio_rusqlite::Connection`] serializes every statement on its
//! background thread. Repositories share one [`SqliteDatabase`] through an
//! `Arc` and submit closures via [`SqliteDatabase::call`]; a closure, once
//! submitted, runs to completion even if the caller stops waiting.

mod logs;
mod messages;
mod schedules;
mod sessions;
mod skills;
mod tasks;
mod users;

pub use logs::SqliteLogRepository;
pub use messages::SqliteMessageRepository;
pub use schedules::SqliteScheduleRepository;
pub use sessions::SqliteSessionRepository;
pub use skills::SqliteSkillRepository;
pub use tasks::SqliteTaskRepository;
pub use users::SqliteUserRepository;

use async_trait::async_trait;
use rusqlite::{ErrorCode, OptionalExtension, Row, ffi, params};
use tokio_rusqlite::Connection;
use tracing::{debug, info};
use workflow_core::{Context, WorkflowError};

use crate::migrations::{AppliedMigration, Migration, MigrationTarget};
use crate::records::{
    LogRecord, MessageRecord, ScheduleRecord, SessionRecord, SkillRecord, TaskRecord, UserRecord,
};

/// Milliseconds a statement waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Shared handle to an open SQLite database file.
pub struct SqliteDatabase {
    conn: Connection,
    path: String,
}

impl SqliteDatabase {
    /// Opens (creating if needed) the database at `path` and applies the
    /// connection PRAGMAs. `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, WorkflowError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| {
                WorkflowError::storage_msg(format!("failed to open sqlite database {path}: {e}"))
            })?;

        conn.call(|conn| {
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;
                 PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
            ))
        })
        .await
        .map_err(|e| map_error("database", e))?;

        info!(path, "sqlite database opened");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Runs `f` on the connection thread, classifying driver errors for `entity`.
    ///
    /// `ctx` is checked again on the connection thread right before `f` runs,
    /// so a closure still queued when the scope is cancelled or its deadline
    /// passes is skipped. Once `f` starts it runs to completion and its
    /// result is returned; the caller is never told a committed write failed.
    pub(crate) async fn call<F, R>(
        &self,
        ctx: &Context,
        entity: &'static str,
        f: F,
    ) -> Result<R, WorkflowError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        ctx.check()?;
        let scope = ctx.clone();
        self.conn
            .call(move |conn| -> Result<R, WorkflowError> {
                scope.check()?;
                f(conn).map_err(|e| classify(entity, e))
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                _ => WorkflowError::storage_msg(format!(
                    "sqlite connection error while running {entity} query"
                )),
            })
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> Result<(), WorkflowError> {
        self.call(&Context::background(), "database", |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        })
        .await
        .map(|_| ())
    }

    /// Stops the connection thread. Later calls fail with a storage error.
    pub async fn close(&self) -> Result<(), WorkflowError> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| {
                WorkflowError::storage_msg(format!("failed to close sqlite database: {e}"))
            })?;
        info!(path = %self.path, "sqlite database closed");
        Ok(())
    }
}

#[async_trait]
impl MigrationTarget for SqliteDatabase {
    async fn ensure_migrations_table(&self) -> Result<(), WorkflowError> {
        self.call(&Context::background(), "migration", |conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version    INTEGER PRIMARY KEY,
                    name       TEXT NOT NULL,
                    dialect    TEXT NOT NULL,
                    applied_at TEXT NOT NULL
                )",
            )
        })
        .await
    }

    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>, WorkflowError> {
        self.call(&Context::background(), "migration", |conn| {
            let mut stmt = conn.prepare(
                "SELECT version, name, dialect, applied_at FROM schema_migrations ORDER BY version",
            )?;
            let applied = stmt
                .query_map([], |row| {
                    Ok(AppliedMigration {
                        version: row.get(0)?,
                        name: row.get(1)?,
                        dialect: row.get(2)?,
                        applied_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(applied)
        })
        .await
    }

    async fn apply_migration(
        &self,
        migration: &Migration,
        dialect: &'static str,
        applied_at: String,
    ) -> Result<(), WorkflowError> {
        let version = migration.version;
        let name = migration.name.clone();
        let sql = migration.up_sql.clone();
        debug!(version, %name, "applying sqlite migration");
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(&sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version, name, dialect, applied_at) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![version, name, dialect, applied_at],
                )?;
                tx.commit()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| {
                WorkflowError::migration(Some(version), format!("apply failed: {e}"))
            })
    }

    async fn revert_migration(&self, migration: &Migration) -> Result<(), WorkflowError> {
        let version = migration.version;
        let sql = migration.down_sql.clone();
        debug!(version, name = %migration.name, "reverting sqlite migration");
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(&sql)?;
                tx.execute(
                    "DELETE FROM schema_migrations WHERE version = ?1",
                    params![version],
                )?;
                tx.commit()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| {
                WorkflowError::migration(Some(version), format!("revert failed: {e}"))
            })
    }
}

/// Maps a tokio-rusqlite error, turning uniqueness violations into conflicts.
pub(crate) fn map_error(
    entity: &'static str,
    err: tokio_rusqlite::Error<rusqlite::Error>,
) -> WorkflowError {
    match err {
        tokio_rusqlite::Error::Error(inner) => classify(entity, inner),
        other => WorkflowError::storage_msg(format!("sqlite connection error: {other}")),
    }
}

fn classify(entity: &'static str, err: rusqlite::Error) -> WorkflowError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err
        && failure.code == ErrorCode::ConstraintViolation
        && matches!(
            failure.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    {
        let detail = message.clone().unwrap_or_else(|| failure.to_string());
        return WorkflowError::conflict(entity, detail);
    }
    WorkflowError::storage(format!("sqlite {entity} query failed"), err)
}

/// `NotFound` when an update or delete touched no row.
pub(crate) fn expect_affected(
    entity: &'static str,
    id: &str,
    affected: usize,
) -> Result<(), WorkflowError> {
    if affected == 0 {
        return Err(WorkflowError::not_found(entity, id));
    }
    Ok(())
}

/// Runs a single-row lookup, returning `None` when no row matches.
pub(crate) fn query_opt<T, P, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
    read: F,
) -> rusqlite::Result<Option<T>>
where
    P: rusqlite::Params,
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    conn.query_row(sql, params, read).optional()
}

/// Runs a listing query and collects every row.
pub(crate) fn query_all<T, P, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
    read: F,
) -> rusqlite::Result<Vec<T>>
where
    P: rusqlite::Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, read)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn user_record(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        channel: row.get(1)?,
        channel_user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(crate) fn session_record(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

pub(crate) fn message_record(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub(crate) fn task_record(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        skill: row.get(2)?,
        input: row.get(3)?,
        output: row.get(4)?,
        status: row.get(5)?,
        error: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) fn skill_record(row: &Row<'_>) -> rusqlite::Result<SkillRecord> {
    Ok(SkillRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        location: row.get(3)?,
        permissions: row.get(4)?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) fn schedule_record(row: &Row<'_>) -> rusqlite::Result<ScheduleRecord> {
    Ok(ScheduleRecord {
        id: row.get(0)?,
        skill: row.get(1)?,
        cron_expression: row.get(2)?,
        input: row.get(3)?,
        enabled: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn log_record(row: &Row<'_>) -> rusqlite::Result<LogRecord> {
    Ok(LogRecord {
        id: row.get(0)?,
        level: row.get(1)?,
        source: row.get(2)?,
        message: row.get(3)?,
        metadata: row.get(4)?,
        created_at: row.get(5)?,
    })
}

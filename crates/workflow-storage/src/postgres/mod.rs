// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Networked PostgreSQL backend.
//!
//! Connections come from a [`deadpool_postgres::Pool`]. Pool objects are
//! guards: they go back to the pool when dropped, on every exit path. The
//! pool is sized from `max_open_conns`; connections older than
//! `conn_max_lifetime` are discarded when recycled, and [`PgDatabase::trim_idle`]
//! drops idle connections above `max_idle_conns`.

mod logs;
mod messages;
mod schedules;
mod sessions;
mod skills;
mod tasks;
mod users;

pub use logs::PgLogRepository;
pub use messages::PgMessageRepository;
pub use schedules::PgScheduleRepository;
pub use sessions::PgSessionRepository;
pub use skills::PgSkillRepository;
pub use tasks::PgTaskRepository;
pub use users::PgUserRepository;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{
    Hook, HookError, Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info, warn};
use workflow_config::DatabaseConfig;
use workflow_core::{Context, WorkflowError};

use crate::migrations::{AppliedMigration, Migration, MigrationTarget};
use crate::records::{
    LogRecord, MessageRecord, ScheduleRecord, SessionRecord, SkillRecord, TaskRecord, UserRecord,
};

type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// Shared handle to a Postgres connection pool.
pub struct PgDatabase {
    pool: Pool,
    max_idle: usize,
    max_lifetime: Duration,
}

impl PgDatabase {
    /// Builds the pool from `config` and checks out one connection so a bad
    /// URL fails here rather than on first use.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, WorkflowError> {
        let url = config.path()?;
        let pg_config: tokio_postgres::Config = url
            .parse()
            .map_err(|e| WorkflowError::storage("invalid postgres connection url", e))?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let max_lifetime = config.conn_max_lifetime();
        let pool = Pool::builder(manager)
            .max_size(config.max_open_conns as usize)
            .runtime(Runtime::Tokio1)
            .pre_recycle(Hook::sync_fn(move |_client, metrics| {
                if metrics.age() > max_lifetime {
                    return Err(HookError::Message(
                        "connection exceeded its max lifetime".into(),
                    ));
                }
                Ok(())
            }))
            .build()
            .map_err(|e| {
                WorkflowError::storage_msg(format!("failed to build postgres pool: {e}"))
            })?;

        let db = Self {
            pool,
            max_idle: config.max_idle_conns as usize,
            max_lifetime,
        };
        db.ping().await?;
        info!(
            max_open = config.max_open_conns,
            max_idle = config.max_idle_conns,
            lifetime_secs = config.conn_max_lifetime_secs,
            "postgres pool ready"
        );
        Ok(db)
    }

    /// Checks out a pooled client.
    pub(crate) async fn client(&self) -> Result<Object, WorkflowError> {
        self.pool
            .get()
            .await
            .map_err(|e| WorkflowError::storage("failed to get postgres connection", e))
    }

    /// Runs one write statement inside its own transaction.
    ///
    /// While the statement runs it races the scope of `ctx`; on abort the
    /// server is asked to cancel the query and the transaction is rolled
    /// back. The scope is checked once more before `COMMIT`, and the commit
    /// itself is awaited to completion, so an error return always means
    /// nothing was written.
    pub(crate) async fn execute(
        &self,
        ctx: &Context,
        entity: &'static str,
        sql: &str,
        params: Params<'_>,
    ) -> Result<u64, WorkflowError> {
        let mut client = ctx.run(self.client()).await?;
        let cancel = client.cancel_token();
        let tx = client
            .transaction()
            .await
            .map_err(|e| map_error(entity, e))?;

        let affected = match ctx
            .run(async { tx.execute(sql, params).await.map_err(|e| map_error(entity, e)) })
            .await
        {
            Ok(affected) => affected,
            Err(e) => {
                if e.is_cancellation()
                    && let Err(cancel_err) = cancel.cancel_query(NoTls).await
                {
                    warn!(entity, error = %cancel_err, "failed to cancel postgres query");
                }
                return Err(e);
            }
        };
        ctx.check()?;
        tx.commit().await.map_err(|e| map_error(entity, e))?;
        Ok(affected)
    }

    pub(crate) async fn query_opt<T>(
        &self,
        entity: &'static str,
        sql: &str,
        params: Params<'_>,
        read: fn(&Row) -> Result<T, tokio_postgres::Error>,
    ) -> Result<Option<T>, WorkflowError> {
        let client = self.client().await?;
        let row = client
            .query_opt(sql, params)
            .await
            .map_err(|e| map_error(entity, e))?;
        row.as_ref()
            .map(read)
            .transpose()
            .map_err(|e| map_error(entity, e))
    }

    pub(crate) async fn query_all<T>(
        &self,
        entity: &'static str,
        sql: &str,
        params: Params<'_>,
        read: fn(&Row) -> Result<T, tokio_postgres::Error>,
    ) -> Result<Vec<T>, WorkflowError> {
        let client = self.client().await?;
        let rows = client
            .query(sql, params)
            .await
            .map_err(|e| map_error(entity, e))?;
        rows.iter()
            .map(read)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_error(entity, e))
    }

    pub async fn ping(&self) -> Result<(), WorkflowError> {
        let client = self.client().await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| map_error("database", e))?;
        Ok(())
    }

    /// Drops idle connections beyond `max_idle_conns` and any past their
    /// lifetime. Returns how many idle connections remain.
    pub fn trim_idle(&self) -> usize {
        let kept = AtomicUsize::new(0);
        let _ = self.pool.retain(|_, metrics| {
            metrics.age() <= self.max_lifetime
                && kept.fetch_add(1, Ordering::Relaxed) < self.max_idle
        });
        let remaining = kept.load(Ordering::Relaxed).min(self.max_idle);
        debug!(remaining, "trimmed idle postgres connections");
        remaining
    }

    /// Closes the pool. Checked-out connections are dropped when returned.
    pub fn close(&self) {
        self.pool.close();
        info!("postgres pool closed");
    }
}

#[async_trait]
impl MigrationTarget for PgDatabase {
    async fn ensure_migrations_table(&self) -> Result<(), WorkflowError> {
        let client = self.client().await?;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS schema_migrations (
                    version    BIGINT PRIMARY KEY,
                    name       TEXT NOT NULL,
                    dialect    TEXT NOT NULL,
                    applied_at TEXT NOT NULL
                )",
            )
            .await
            .map_err(|e| map_error("migration", e))
    }

    async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>, WorkflowError> {
        self.query_all(
            "migration",
            "SELECT version, name, dialect, applied_at FROM schema_migrations ORDER BY version",
            &[],
            |row| {
                Ok(AppliedMigration {
                    version: row.try_get(0)?,
                    name: row.try_get(1)?,
                    dialect: row.try_get(2)?,
                    applied_at: row.try_get(3)?,
                })
            },
        )
        .await
    }

    async fn apply_migration(
        &self,
        migration: &Migration,
        dialect: &'static str,
        applied_at: String,
    ) -> Result<(), WorkflowError> {
        let version = migration.version;
        let failed = |e: tokio_postgres::Error| {
            WorkflowError::migration(Some(version), format!("apply failed: {e}"))
        };
        debug!(version, name = %migration.name, "applying postgres migration");

        let mut client = self.client().await?;
        let tx = client.transaction().await.map_err(failed)?;
        tx.batch_execute(&migration.up_sql).await.map_err(failed)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, dialect, applied_at) \
             VALUES ($1, $2, $3, $4)",
            &[&version, &migration.name, &dialect, &applied_at],
        )
        .await
        .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }

    async fn revert_migration(&self, migration: &Migration) -> Result<(), WorkflowError> {
        let version = migration.version;
        let failed = |e: tokio_postgres::Error| {
            WorkflowError::migration(Some(version), format!("revert failed: {e}"))
        };
        debug!(version, name = %migration.name, "reverting postgres migration");

        let mut client = self.client().await?;
        let tx = client.transaction().await.map_err(failed)?;
        tx.batch_execute(&migration.down_sql).await.map_err(failed)?;
        tx.execute(
            "DELETE FROM schema_migrations WHERE version = $1",
            &[&version],
        )
        .await
        .map_err(failed)?;
        tx.commit().await.map_err(failed)
    }
}

/// Maps a driver error, turning unique violations into conflicts.
pub(crate) fn map_error(entity: &'static str, err: tokio_postgres::Error) -> WorkflowError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        let detail = err
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| err.to_string());
        return WorkflowError::conflict(entity, detail);
    }
    WorkflowError::storage(format!("postgres {entity} query failed"), err)
}

/// `NotFound` when an update or delete touched no row.
pub(crate) fn expect_affected(
    entity: &'static str,
    id: &str,
    affected: u64,
) -> Result<(), WorkflowError> {
    if affected == 0 {
        return Err(WorkflowError::not_found(entity, id));
    }
    Ok(())
}

/// `LIMIT` parameter; Postgres binds it as `BIGINT`.
pub(crate) fn limit_param(limit: u32) -> i64 {
    i64::from(limit)
}

pub(crate) fn user_record(row: &Row) -> Result<UserRecord, tokio_postgres::Error> {
    Ok(UserRecord {
        id: row.try_get(0)?,
        channel: row.try_get(1)?,
        channel_user_id: row.try_get(2)?,
        created_at: row.try_get(3)?,
    })
}

pub(crate) fn session_record(row: &Row) -> Result<SessionRecord, tokio_postgres::Error> {
    Ok(SessionRecord {
        id: row.try_get(0)?,
        user_id: row.try_get(1)?,
        created_at: row.try_get(2)?,
        updated_at: row.try_get(3)?,
    })
}

pub(crate) fn message_record(row: &Row) -> Result<MessageRecord, tokio_postgres::Error> {
    Ok(MessageRecord {
        id: row.try_get(0)?,
        session_id: row.try_get(1)?,
        role: row.try_get(2)?,
        content: row.try_get(3)?,
        created_at: row.try_get(4)?,
    })
}

pub(crate) fn task_record(row: &Row) -> Result<TaskRecord, tokio_postgres::Error> {
    Ok(TaskRecord {
        id: row.try_get(0)?,
        session_id: row.try_get(1)?,
        skill: row.try_get(2)?,
        input: row.try_get(3)?,
        output: row.try_get(4)?,
        status: row.try_get(5)?,
        error: row.try_get(6)?,
        created_at: row.try_get(7)?,
        updated_at: row.try_get(8)?,
    })
}

pub(crate) fn skill_record(row: &Row) -> Result<SkillRecord, tokio_postgres::Error> {
    Ok(SkillRecord {
        id: row.try_get(0)?,
        name: row.try_get(1)?,
        version: row.try_get(2)?,
        location: row.try_get(3)?,
        permissions: row.try_get(4)?,
        metadata: row.try_get(5)?,
        created_at: row.try_get(6)?,
    })
}

pub(crate) fn schedule_record(row: &Row) -> Result<ScheduleRecord, tokio_postgres::Error> {
    let enabled: i32 = row.try_get(4)?;
    Ok(ScheduleRecord {
        id: row.try_get(0)?,
        skill: row.try_get(1)?,
        cron_expression: row.try_get(2)?,
        input: row.try_get(3)?,
        enabled: i64::from(enabled),
        created_at: row.try_get(5)?,
    })
}

pub(crate) fn log_record(row: &Row) -> Result<LogRecord, tokio_postgres::Error> {
    Ok(LogRecord {
        id: row.try_get(0)?,
        level: row.try_get(1)?,
        source: row.try_get(2)?,
        message: row.try_get(3)?,
        metadata: row.try_get(4)?,
        created_at: row.try_get(5)?,
    })
}

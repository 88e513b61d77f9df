// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, Log, LogId, LogLevel, LogRepository, WorkflowError};

use super::{SqliteDatabase, expect_affected, log_record, query_all, query_opt};
use crate::mappers::{format_timestamp, log_from_row, log_from_row_opt, log_to_row};
use crate::records::{LOG_COLUMNS, LogRecord};

const ENTITY: &str = "log";

/// [`LogRepository`] over the `logs` table.
pub struct SqliteLogRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteLogRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

fn into_logs(rows: Vec<LogRecord>) -> Result<Vec<Log>, WorkflowError> {
    rows.into_iter().map(log_from_row).collect()
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn create(&self, ctx: &Context, log: &Log) -> Result<(), WorkflowError> {
        let row = log_to_row(log);
        debug!(log_id = %row.id, level = %row.level, source = %row.source, "creating log");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!("INSERT INTO logs ({LOG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![row.id, row.level, row.source, row.message, row.metadata, row.created_at],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &LogId) -> Result<Log, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {LOG_COLUMNS} FROM logs WHERE id = ?1"),
                    params![key],
                    log_record,
                )
            })
            .await?;
        log_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_level(
        &self,
        ctx: &Context,
        level: LogLevel,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError> {
        let key = level.as_str();
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {LOG_COLUMNS} FROM logs WHERE level = ?1 \
                         ORDER BY created_at DESC LIMIT ?2"
                    ),
                    params![key, limit],
                    log_record,
                )
            })
            .await?;
        into_logs(rows)
    }

    async fn find_by_source(
        &self,
        ctx: &Context,
        source: &str,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError> {
        let key = source.to_string();
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {LOG_COLUMNS} FROM logs WHERE source = ?1 \
                         ORDER BY created_at DESC LIMIT ?2"
                    ),
                    params![key, limit],
                    log_record,
                )
            })
            .await?;
        into_logs(rows)
    }

    async fn find_by_date_range(
        &self,
        ctx: &Context,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError> {
        let (from, to) = (format_timestamp(from), format_timestamp(to));
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {LOG_COLUMNS} FROM logs \
                         WHERE created_at >= ?1 AND created_at <= ?2 \
                         ORDER BY created_at DESC LIMIT ?3"
                    ),
                    params![from, to, limit],
                    log_record,
                )
            })
            .await?;
        into_logs(rows)
    }

    async fn count_by_level(&self, ctx: &Context, level: LogLevel) -> Result<u64, WorkflowError> {
        let key = level.as_str();
        let count: i64 = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM logs WHERE level = ?1",
                    params![key],
                    |row| row.get(0),
                )
            })
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn delete_older_than(
        &self,
        ctx: &Context,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, WorkflowError> {
        let key = format_timestamp(cutoff);
        let deleted = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM logs WHERE created_at < ?1", params![key])
            })
            .await?;
        debug!(%cutoff, deleted, "pruned old logs");
        Ok(deleted as u64)
    }

    async fn delete(&self, ctx: &Context, id: &LogId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(log_id = %id, "deleting log");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM logs WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

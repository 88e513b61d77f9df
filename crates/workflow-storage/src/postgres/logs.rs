// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use workflow_core::{Context, Log, LogId, LogLevel, LogRepository, WorkflowError};

use super::{PgDatabase, expect_affected, limit_param, log_record};
use crate::mappers::{format_timestamp, log_from_row, log_from_row_opt, log_to_row};
use crate::records::{LOG_COLUMNS, LogRecord};

const ENTITY: &str = "log";

/// [`LogRepository`] over the `logs` table.
pub struct PgLogRepository {
    db: Arc<PgDatabase>,
}

impl PgLogRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

fn into_logs(rows: Vec<LogRecord>) -> Result<Vec<Log>, WorkflowError> {
    rows.into_iter().map(log_from_row).collect()
}

#[async_trait]
impl LogRepository for PgLogRepository {
    async fn create(&self, ctx: &Context, log: &Log) -> Result<(), WorkflowError> {
        let row = log_to_row(log);
        debug!(log_id = %row.id, level = %row.level, source = %row.source, "creating log");
        let sql = format!("INSERT INTO logs ({LOG_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[
                    &row.id,
                    &row.level,
                    &row.source,
                    &row.message,
                    &row.metadata,
                    &row.created_at,
                ],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &LogId) -> Result<Log, WorkflowError> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM logs WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], log_record))
            .await?;
        log_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_level(
        &self,
        ctx: &Context,
        level: LogLevel,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE level = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let limit = limit_param(limit);
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&level.as_str(), &limit], log_record))
            .await?;
        into_logs(rows)
    }

    async fn find_by_source(
        &self,
        ctx: &Context,
        source: &str,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE source = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let limit = limit_param(limit);
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&source, &limit], log_record))
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
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE created_at >= $1 AND created_at <= $2 \
             ORDER BY created_at DESC LIMIT $3"
        );
        let (from, to) = (format_timestamp(from), format_timestamp(to));
        let limit = limit_param(limit);
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&from, &to, &limit], log_record))
            .await?;
        into_logs(rows)
    }

    async fn count_by_level(&self, ctx: &Context, level: LogLevel) -> Result<u64, WorkflowError> {
        let count = ctx
            .run(self.db.query_opt(
                ENTITY,
                "SELECT COUNT(*) FROM logs WHERE level = $1",
                &[&level.as_str()],
                |row| row.try_get::<_, i64>(0),
            ))
            .await?
            .unwrap_or_default();
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
            .execute(ctx, ENTITY, "DELETE FROM logs WHERE created_at < $1", &[&key])
            .await?;
        debug!(%cutoff, deleted, "pruned old logs");
        Ok(deleted)
    }

    async fn delete(&self, ctx: &Context, id: &LogId) -> Result<(), WorkflowError> {
        debug!(log_id = %id, "deleting log");
        let affected = self
            .db
            .execute(ctx, ENTITY, "DELETE FROM logs WHERE id = $1", &[&id.as_str()])
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

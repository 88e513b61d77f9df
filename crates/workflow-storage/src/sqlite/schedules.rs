// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, Schedule, ScheduleId, ScheduleRepository, WorkflowError};

use super::{SqliteDatabase, expect_affected, query_all, query_opt, schedule_record};
use crate::mappers::{schedule_from_row, schedule_from_row_opt, schedule_to_row};
use crate::records::SCHEDULE_COLUMNS;

const ENTITY: &str = "schedule";

/// [`ScheduleRepository`] over the `schedules` table.
pub struct SqliteScheduleRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteScheduleRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    async fn select(
        &self,
        ctx: &Context,
        filter: &'static str,
        key: Option<String>,
    ) -> Result<Vec<Schedule>, WorkflowError> {
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                let sql =
                    format!("SELECT {SCHEDULE_COLUMNS} FROM schedules {filter} ORDER BY created_at");
                match key {
                    Some(key) => query_all(conn, &sql, params![key], schedule_record),
                    None => query_all(conn, &sql, [], schedule_record),
                }
            })
            .await?;
        rows.into_iter().map(schedule_from_row).collect()
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    async fn create(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError> {
        let row = schedule_to_row(schedule);
        debug!(schedule_id = %row.id, skill = %row.skill, cron = %row.cron_expression, "creating schedule");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO schedules ({SCHEDULE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ),
                params![
                    row.id,
                    row.skill,
                    row.cron_expression,
                    row.input,
                    row.enabled,
                    row.created_at,
                ],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(
        &self,
        ctx: &Context,
        id: &ScheduleId,
    ) -> Result<Schedule, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?1"),
                    params![key],
                    schedule_record,
                )
            })
            .await?;
        schedule_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_skill(
        &self,
        ctx: &Context,
        skill: &str,
    ) -> Result<Vec<Schedule>, WorkflowError> {
        self.select(ctx, "WHERE skill = ?1", Some(skill.to_string()))
            .await
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError> {
        self.select(ctx, "", None).await
    }

    async fn find_enabled(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError> {
        self.select(ctx, "WHERE enabled = 1", None).await
    }

    async fn update(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError> {
        let row = schedule_to_row(schedule);
        let id = row.id.clone();
        debug!(schedule_id = %id, enabled = row.enabled, "updating schedule");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute(
                    "UPDATE schedules SET cron_expression = ?2, input = ?3, enabled = ?4 \
                     WHERE id = ?1",
                    params![row.id, row.cron_expression, row.input, row.enabled],
                )
            })
            .await?;
        expect_affected(ENTITY, &id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &ScheduleId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(schedule_id = %id, "deleting schedule");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM schedules WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Context, Schedule, ScheduleId, ScheduleRepository, WorkflowError};

use super::{PgDatabase, expect_affected, schedule_record};
use crate::mappers::{schedule_from_row, schedule_from_row_opt, schedule_to_row};
use crate::records::{SCHEDULE_COLUMNS, ScheduleRecord};

const ENTITY: &str = "schedule";

/// [`ScheduleRepository`] over the `schedules` table.
pub struct PgScheduleRepository {
    db: Arc<PgDatabase>,
}

impl PgScheduleRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

fn into_schedules(rows: Vec<ScheduleRecord>) -> Result<Vec<Schedule>, WorkflowError> {
    rows.into_iter().map(schedule_from_row).collect()
}

/// `enabled` is an `INTEGER` column.
fn enabled_param(row: &ScheduleRecord) -> i32 {
    i32::from(row.enabled != 0)
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn create(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError> {
        let row = schedule_to_row(schedule);
        let enabled = enabled_param(&row);
        debug!(schedule_id = %row.id, skill = %row.skill, "creating schedule");
        let sql =
            format!("INSERT INTO schedules ({SCHEDULE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[
                    &row.id,
                    &row.skill,
                    &row.cron_expression,
                    &row.input,
                    &enabled,
                    &row.created_at,
                ],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(
        &self,
        ctx: &Context,
        id: &ScheduleId,
    ) -> Result<Schedule, WorkflowError> {
        let sql = format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], schedule_record))
            .await?;
        schedule_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_skill(
        &self,
        ctx: &Context,
        skill: &str,
    ) -> Result<Vec<Schedule>, WorkflowError> {
        let sql = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE skill = $1 ORDER BY created_at"
        );
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&skill], schedule_record))
            .await?;
        into_schedules(rows)
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError> {
        let sql = format!("SELECT {SCHEDULE_COLUMNS} FROM schedules ORDER BY created_at");
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[], schedule_record))
            .await?;
        into_schedules(rows)
    }

    async fn find_enabled(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError> {
        let sql = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE enabled = 1 ORDER BY created_at"
        );
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[], schedule_record))
            .await?;
        into_schedules(rows)
    }

    async fn update(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError> {
        let row = schedule_to_row(schedule);
        let enabled = enabled_param(&row);
        debug!(schedule_id = %row.id, enabled, "updating schedule");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "UPDATE schedules SET cron_expression = $2, input = $3, enabled = $4 WHERE id = $1",
                &[&row.id, &row.cron_expression, &row.input, &enabled],
            )
            .await?;
        expect_affected(ENTITY, &row.id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &ScheduleId) -> Result<(), WorkflowError> {
        debug!(schedule_id = %id, "deleting schedule");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "DELETE FROM schedules WHERE id = $1",
                &[&id.as_str()],
            )
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

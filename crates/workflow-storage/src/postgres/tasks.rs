// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Context, SessionId, Task, TaskId, TaskRepository, WorkflowError};

use super::{PgDatabase, expect_affected, task_record};
use crate::mappers::{task_from_row, task_from_row_opt, task_to_row};
use crate::records::TASK_COLUMNS;

const ENTITY: &str = "task";

/// [`TaskRepository`] over the `tasks` table.
pub struct PgTaskRepository {
    db: Arc<PgDatabase>,
}

impl PgTaskRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError> {
        let row = task_to_row(task);
        debug!(task_id = %row.id, session_id = %row.session_id, skill = %row.skill, "creating task");
        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        );
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[
                    &row.id,
                    &row.session_id,
                    &row.skill,
                    &row.input,
                    &row.output,
                    &row.status,
                    &row.error,
                    &row.created_at,
                    &row.updated_at,
                ],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &TaskId) -> Result<Task, WorkflowError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], task_record))
            .await?;
        task_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Task>, WorkflowError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE session_id = $1 ORDER BY created_at DESC"
        );
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&session_id.as_str()], task_record))
            .await?;
        rows.into_iter().map(task_from_row).collect()
    }

    async fn update(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError> {
        let row = task_to_row(task);
        debug!(task_id = %row.id, status = %row.status, "updating task");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "UPDATE tasks SET status = $2, output = $3, error = $4, updated_at = $5 \
                 WHERE id = $1",
                &[&row.id, &row.status, &row.output, &row.error, &row.updated_at],
            )
            .await?;
        expect_affected(ENTITY, &row.id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &TaskId) -> Result<(), WorkflowError> {
        debug!(task_id = %id, "deleting task");
        let affected = self
            .db
            .execute(ctx, ENTITY, "DELETE FROM tasks WHERE id = $1", &[&id.as_str()])
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

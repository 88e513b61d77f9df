// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, SessionId, Task, TaskId, TaskRepository, WorkflowError};

use super::{SqliteDatabase, expect_affected, query_all, query_opt, task_record};
use crate::mappers::{task_from_row, task_from_row_opt, task_to_row};
use crate::records::TASK_COLUMNS;

const ENTITY: &str = "task";

/// [`TaskRepository`] over the `tasks` table.
pub struct SqliteTaskRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteTaskRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError> {
        let row = task_to_row(task);
        debug!(task_id = %row.id, session_id = %row.session_id, skill = %row.skill, "creating task");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO tasks ({TASK_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    row.id,
                    row.session_id,
                    row.skill,
                    row.input,
                    row.output,
                    row.status,
                    row.error,
                    row.created_at,
                    row.updated_at,
                ],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &TaskId) -> Result<Task, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                    params![key],
                    task_record,
                )
            })
            .await?;
        task_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Task>, WorkflowError> {
        let key = session_id.to_string();
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {TASK_COLUMNS} FROM tasks WHERE session_id = ?1 \
                         ORDER BY created_at DESC"
                    ),
                    params![key],
                    task_record,
                )
            })
            .await?;
        rows.into_iter().map(task_from_row).collect()
    }

    async fn update(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError> {
        let row = task_to_row(task);
        let id = row.id.clone();
        debug!(task_id = %id, status = %row.status, "updating task");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute(
                    "UPDATE tasks SET status = ?2, output = ?3, error = ?4, updated_at = ?5 \
                     WHERE id = ?1",
                    params![row.id, row.status, row.output, row.error, row.updated_at],
                )
            })
            .await?;
        expect_affected(ENTITY, &id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &TaskId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(task_id = %id, "deleting task");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM tasks WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

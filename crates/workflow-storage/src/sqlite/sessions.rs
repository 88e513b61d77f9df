// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, Session, SessionId, SessionRepository, UserId, WorkflowError};

use super::{SqliteDatabase, expect_affected, query_all, query_opt, session_record};
use crate::mappers::{session_from_row, session_from_row_opt, session_to_row};
use crate::records::SESSION_COLUMNS;

const ENTITY: &str = "session";

/// [`SessionRepository`] over the `sessions` table.
pub struct SqliteSessionRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteSessionRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError> {
        let row = session_to_row(session);
        debug!(session_id = %row.id, user_id = %row.user_id, "creating session");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
                params![row.id, row.user_id, row.created_at, row.updated_at],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &SessionId) -> Result<Session, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                    params![key],
                    session_record,
                )
            })
            .await?;
        session_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_user_id(
        &self,
        ctx: &Context,
        user_id: &UserId,
    ) -> Result<Vec<Session>, WorkflowError> {
        let key = user_id.to_string();
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1 \
                         ORDER BY created_at"
                    ),
                    params![key],
                    session_record,
                )
            })
            .await?;
        rows.into_iter().map(session_from_row).collect()
    }

    async fn update(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError> {
        let row = session_to_row(session);
        let id = row.id.clone();
        debug!(session_id = %id, "updating session");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute(
                    "UPDATE sessions SET updated_at = ?2 WHERE id = ?1",
                    params![row.id, row.updated_at],
                )
            })
            .await?;
        expect_affected(ENTITY, &id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &SessionId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(session_id = %id, "deleting session");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM sessions WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

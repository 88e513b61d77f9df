// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Context, Session, SessionId, SessionRepository, UserId, WorkflowError};

use super::{PgDatabase, expect_affected, session_record};
use crate::mappers::{session_from_row, session_from_row_opt, session_to_row};
use crate::records::SESSION_COLUMNS;

const ENTITY: &str = "session";

/// [`SessionRepository`] over the `sessions` table.
pub struct PgSessionRepository {
    db: Arc<PgDatabase>,
}

impl PgSessionRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError> {
        let row = session_to_row(session);
        debug!(session_id = %row.id, user_id = %row.user_id, "creating session");
        let sql = format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES ($1, $2, $3, $4)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[&row.id, &row.user_id, &row.created_at, &row.updated_at],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &SessionId) -> Result<Session, WorkflowError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], session_record))
            .await?;
        session_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_user_id(
        &self,
        ctx: &Context,
        user_id: &UserId,
    ) -> Result<Vec<Session>, WorkflowError> {
        let sql =
            format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at");
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&user_id.as_str()], session_record))
            .await?;
        rows.into_iter().map(session_from_row).collect()
    }

    async fn update(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError> {
        let row = session_to_row(session);
        debug!(session_id = %row.id, "updating session");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "UPDATE sessions SET updated_at = $2 WHERE id = $1",
                &[&row.id, &row.updated_at],
            )
            .await?;
        expect_affected(ENTITY, &row.id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &SessionId) -> Result<(), WorkflowError> {
        debug!(session_id = %id, "deleting session");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "DELETE FROM sessions WHERE id = $1",
                &[&id.as_str()],
            )
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

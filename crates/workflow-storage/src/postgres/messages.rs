// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Context, Message, MessageId, MessageRepository, SessionId, WorkflowError};

use super::{PgDatabase, expect_affected, message_record};
use crate::mappers::{message_from_row, message_from_row_opt, message_to_row};
use crate::records::MESSAGE_COLUMNS;

const ENTITY: &str = "message";

/// [`MessageRepository`] over the `messages` table.
pub struct PgMessageRepository {
    db: Arc<PgDatabase>,
}

impl PgMessageRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, ctx: &Context, message: &Message) -> Result<(), WorkflowError> {
        let row = message_to_row(message);
        debug!(message_id = %row.id, session_id = %row.session_id, "creating message");
        let sql = format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES ($1, $2, $3, $4, $5)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[&row.id, &row.session_id, &row.role, &row.content, &row.created_at],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &MessageId) -> Result<Message, WorkflowError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], message_record))
            .await?;
        message_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Message>, WorkflowError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = $1 ORDER BY created_at ASC"
        );
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[&session_id.as_str()], message_record))
            .await?;
        rows.into_iter().map(message_from_row).collect()
    }

    async fn delete(&self, ctx: &Context, id: &MessageId) -> Result<(), WorkflowError> {
        debug!(message_id = %id, "deleting message");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "DELETE FROM messages WHERE id = $1",
                &[&id.as_str()],
            )
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }

    async fn delete_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<u64, WorkflowError> {
        let deleted = self
            .db
            .execute(
                ctx,
                ENTITY,
                "DELETE FROM messages WHERE session_id = $1",
                &[&session_id.as_str()],
            )
            .await?;
        debug!(session_id = %session_id, deleted, "deleted session messages");
        Ok(deleted)
    }
}

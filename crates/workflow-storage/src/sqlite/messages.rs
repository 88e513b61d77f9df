// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, Message, MessageId, MessageRepository, SessionId, WorkflowError};

use super::{SqliteDatabase, expect_affected, message_record, query_all, query_opt};
use crate::mappers::{message_from_row, message_from_row_opt, message_to_row};
use crate::records::MESSAGE_COLUMNS;

const ENTITY: &str = "message";

/// [`MessageRepository`] over the `messages` table.
pub struct SqliteMessageRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteMessageRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, ctx: &Context, message: &Message) -> Result<(), WorkflowError> {
        let row = message_to_row(message);
        debug!(message_id = %row.id, session_id = %row.session_id, role = %row.role, "creating message");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                params![row.id, row.session_id, row.role, row.content, row.created_at],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &MessageId) -> Result<Message, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![key],
                    message_record,
                )
            })
            .await?;
        message_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Message>, WorkflowError> {
        let key = session_id.to_string();
        let rows = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_all(
                    conn,
                    &format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 \
                         ORDER BY created_at ASC"
                    ),
                    params![key],
                    message_record,
                )
            })
            .await?;
        rows.into_iter().map(message_from_row).collect()
    }

    async fn delete(&self, ctx: &Context, id: &MessageId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(message_id = %id, "deleting message");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM messages WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }

    async fn delete_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<u64, WorkflowError> {
        let key = session_id.to_string();
        let deleted = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM messages WHERE session_id = ?1", params![key])
            })
            .await?;
        debug!(session_id = %session_id, deleted, "deleted session messages");
        Ok(deleted as u64)
    }
}

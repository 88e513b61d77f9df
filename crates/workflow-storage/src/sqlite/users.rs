// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Channel, Context, User, UserId, UserRepository, WorkflowError};

use super::{SqliteDatabase, expect_affected, query_all, query_opt, user_record};
use crate::mappers::{user_from_row, user_from_row_opt, user_to_row};
use crate::records::USER_COLUMNS;

const ENTITY: &str = "user";

/// [`UserRepository`] over the `users` table.
pub struct SqliteUserRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, ctx: &Context, user: &User) -> Result<(), WorkflowError> {
        let row = user_to_row(user);
        debug!(user_id = %row.id, channel = %row.channel, "creating user");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
                params![row.id, row.channel, row.channel_user_id, row.created_at],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &UserId) -> Result<User, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                    params![key],
                    user_record,
                )
            })
            .await?;
        user_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_channel(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        let channel_key = channel.as_str();
        let id_key = channel_id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!(
                        "SELECT {USER_COLUMNS} FROM users WHERE channel = ?1 AND channel_user_id = ?2"
                    ),
                    params![channel_key, id_key],
                    user_record,
                )
            })
            .await?;
        user_from_row_opt(row)?
            .ok_or_else(|| WorkflowError::not_found(ENTITY, format!("{channel}:{channel_id}")))
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<User>, WorkflowError> {
        let rows = self
            .db
            .call(ctx, ENTITY, |conn| {
                query_all(
                    conn,
                    &format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"),
                    [],
                    user_record,
                )
            })
            .await?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn delete(&self, ctx: &Context, id: &UserId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(user_id = %id, "deleting user");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM users WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

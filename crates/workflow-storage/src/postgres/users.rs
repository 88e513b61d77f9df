// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Channel, Context, User, UserId, UserRepository, WorkflowError};

use super::{PgDatabase, expect_affected, user_record};
use crate::mappers::{user_from_row, user_from_row_opt, user_to_row};
use crate::records::USER_COLUMNS;

const ENTITY: &str = "user";

/// [`UserRepository`] over the `users` table.
pub struct PgUserRepository {
    db: Arc<PgDatabase>,
}

impl PgUserRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, ctx: &Context, user: &User) -> Result<(), WorkflowError> {
        let row = user_to_row(user);
        debug!(user_id = %row.id, channel = %row.channel, "creating user");
        let sql = format!("INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[&row.id, &row.channel, &row.channel_user_id, &row.created_at],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &UserId) -> Result<User, WorkflowError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], user_record))
            .await?;
        user_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_channel(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE channel = $1 AND channel_user_id = $2"
        );
        let row = ctx
            .run(self.db.query_opt(
                ENTITY,
                &sql,
                &[&channel.as_str(), &channel_id],
                user_record,
            ))
            .await?;
        user_from_row_opt(row)?
            .ok_or_else(|| WorkflowError::not_found(ENTITY, format!("{channel}:{channel_id}")))
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<User>, WorkflowError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[], user_record))
            .await?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn delete(&self, ctx: &Context, id: &UserId) -> Result<(), WorkflowError> {
        debug!(user_id = %id, "deleting user");
        let affected = self
            .db
            .execute(ctx, ENTITY, "DELETE FROM users WHERE id = $1", &[&id.as_str()])
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

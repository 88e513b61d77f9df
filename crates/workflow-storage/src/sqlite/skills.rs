// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;
use workflow_core::{Context, Skill, SkillId, SkillRepository, WorkflowError};

use super::{SqliteDatabase, expect_affected, query_all, query_opt, skill_record};
use crate::mappers::{skill_from_row, skill_from_row_opt, skill_to_row};
use crate::records::SKILL_COLUMNS;

const ENTITY: &str = "skill";

/// [`SkillRepository`] over the `skills` table.
pub struct SqliteSkillRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteSkillRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SkillRepository for SqliteSkillRepository {
    async fn create(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError> {
        let row = skill_to_row(skill);
        debug!(skill_id = %row.id, name = %row.name, version = %row.version, "creating skill");
        self.db.call(ctx, ENTITY, move |conn| {
            conn.execute(
                &format!("INSERT INTO skills ({SKILL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    row.id,
                    row.name,
                    row.version,
                    row.location,
                    row.permissions,
                    row.metadata,
                    row.created_at,
                ],
            )
        })
        .await
        .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &SkillId) -> Result<Skill, WorkflowError> {
        let key = id.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = ?1"),
                    params![key],
                    skill_record,
                )
            })
            .await?;
        skill_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_name(&self, ctx: &Context, name: &str) -> Result<Skill, WorkflowError> {
        let key = name.to_string();
        let row = self
            .db
            .call(ctx, ENTITY, move |conn| {
                query_opt(
                    conn,
                    &format!("SELECT {SKILL_COLUMNS} FROM skills WHERE name = ?1"),
                    params![key],
                    skill_record,
                )
            })
            .await?;
        skill_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, name))
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<Skill>, WorkflowError> {
        let rows = self
            .db
            .call(ctx, ENTITY, |conn| {
                query_all(
                    conn,
                    &format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY name"),
                    [],
                    skill_record,
                )
            })
            .await?;
        rows.into_iter().map(skill_from_row).collect()
    }

    async fn update(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError> {
        let row = skill_to_row(skill);
        let id = row.id.clone();
        debug!(skill_id = %id, version = %row.version, "updating skill");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute(
                    "UPDATE skills SET version = ?2, location = ?3, permissions = ?4, \
                     metadata = ?5 WHERE id = ?1",
                    params![row.id, row.version, row.location, row.permissions, row.metadata],
                )
            })
            .await?;
        expect_affected(ENTITY, &id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &SkillId) -> Result<(), WorkflowError> {
        let key = id.to_string();
        debug!(skill_id = %id, "deleting skill");
        let affected = self
            .db
            .call(ctx, ENTITY, move |conn| {
                conn.execute("DELETE FROM skills WHERE id = ?1", params![key])
            })
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

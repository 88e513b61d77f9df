// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use workflow_core::{Context, Skill, SkillId, SkillRepository, WorkflowError};

use super::{PgDatabase, expect_affected, skill_record};
use crate::mappers::{skill_from_row, skill_from_row_opt, skill_to_row};
use crate::records::SKILL_COLUMNS;

const ENTITY: &str = "skill";

/// [`SkillRepository`] over the `skills` table.
pub struct PgSkillRepository {
    db: Arc<PgDatabase>,
}

impl PgSkillRepository {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SkillRepository for PgSkillRepository {
    async fn create(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError> {
        let row = skill_to_row(skill);
        debug!(skill_id = %row.id, name = %row.name, version = %row.version, "creating skill");
        let sql =
            format!("INSERT INTO skills ({SKILL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)");
        self.db
            .execute(
                ctx,
                ENTITY,
                &sql,
                &[
                    &row.id,
                    &row.name,
                    &row.version,
                    &row.location,
                    &row.permissions,
                    &row.metadata,
                    &row.created_at,
                ],
            )
            .await
            .map(|_| ())
    }

    async fn find_by_id(&self, ctx: &Context, id: &SkillId) -> Result<Skill, WorkflowError> {
        let sql = format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&id.as_str()], skill_record))
            .await?;
        skill_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))
    }

    async fn find_by_name(&self, ctx: &Context, name: &str) -> Result<Skill, WorkflowError> {
        let sql = format!("SELECT {SKILL_COLUMNS} FROM skills WHERE name = $1");
        let row = ctx
            .run(self.db.query_opt(ENTITY, &sql, &[&name], skill_record))
            .await?;
        skill_from_row_opt(row)?.ok_or_else(|| WorkflowError::not_found(ENTITY, name))
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<Skill>, WorkflowError> {
        let sql = format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY name");
        let rows = ctx
            .run(self.db.query_all(ENTITY, &sql, &[], skill_record))
            .await?;
        rows.into_iter().map(skill_from_row).collect()
    }

    async fn update(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError> {
        let row = skill_to_row(skill);
        debug!(skill_id = %row.id, version = %row.version, "updating skill");
        let affected = self
            .db
            .execute(
                ctx,
                ENTITY,
                "UPDATE skills SET version = $2, location = $3, permissions = $4, metadata = $5 \
                 WHERE id = $1",
                &[&row.id, &row.version, &row.location, &row.permissions, &row.metadata],
            )
            .await?;
        expect_affected(ENTITY, &row.id, affected)
    }

    async fn delete(&self, ctx: &Context, id: &SkillId) -> Result<(), WorkflowError> {
        debug!(skill_id = %id, "deleting skill");
        let affected = self
            .db
            .execute(ctx, ENTITY, "DELETE FROM skills WHERE id = $1", &[&id.as_str()])
            .await?;
        expect_affected(ENTITY, id.as_str(), affected)
    }
}

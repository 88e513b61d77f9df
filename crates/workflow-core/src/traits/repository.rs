// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository contracts, one per entity.
//!
//! | Trait | Entity | Implementations |
//! |-------|--------|-----------------|
//! | [`UserRepository`] | [`User`] | `SqliteUserRepository`, `PgUserRepository` |
//! | [`SessionRepository`] | [`Session`] | `SqliteSessionRepository`, `PgSessionRepository` |
//! | [`MessageRepository`] | [`Message`] | `SqliteMessageRepository`, `PgMessageRepository` |
//! | [`TaskRepository`] | [`Task`] | `SqliteTaskRepository`, `PgTaskRepository` |
//! | [`SkillRepository`] | [`Skill`] | `SqliteSkillRepository`, `PgSkillRepository` |
//! | [`ScheduleRepository`] | [`Schedule`] | `SqliteScheduleRepository`, `PgScheduleRepository` |
//! | [`LogRepository`] | [`Log`] | `SqliteLogRepository`, `PgLogRepository` |
//!
//! Shared guarantees:
//!
//! - Single-entity lookups, `update` and `delete` return
//!   [`WorkflowError::NotFound`] when the row is absent.
//! - Uniqueness violations return [`WorkflowError::Conflict`].
//! - Every call is one statement and honours the [`Context`]: once it is
//!   cancelled or past its deadline the call returns `Cancelled` /
//!   `DeadlineExceeded` at its next suspension point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::domain::{Log, Message, Schedule, Session, Skill, Task, User};
use crate::error::WorkflowError;
use crate::types::{
    Channel, LogId, LogLevel, MessageId, ScheduleId, SessionId, SkillId, TaskId, UserId,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, ctx: &Context, user: &User) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &UserId) -> Result<User, WorkflowError>;

    /// Looks up the user behind a platform identity.
    async fn find_by_channel(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError>;

    async fn list(&self, ctx: &Context) -> Result<Vec<User>, WorkflowError>;

    /// Deletes the user together with its sessions, messages and tasks.
    async fn delete(&self, ctx: &Context, id: &UserId) -> Result<(), WorkflowError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &SessionId) -> Result<Session, WorkflowError>;

    async fn find_by_user_id(
        &self,
        ctx: &Context,
        user_id: &UserId,
    ) -> Result<Vec<Session>, WorkflowError>;

    /// Persists `updated_at`; the owner of a session never changes.
    async fn update(&self, ctx: &Context, session: &Session) -> Result<(), WorkflowError>;

    /// Deletes the session together with its messages and tasks.
    async fn delete(&self, ctx: &Context, id: &SessionId) -> Result<(), WorkflowError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, ctx: &Context, message: &Message) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &MessageId) -> Result<Message, WorkflowError>;

    /// Messages of a session, oldest first.
    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Message>, WorkflowError>;

    async fn delete(&self, ctx: &Context, id: &MessageId) -> Result<(), WorkflowError>;

    /// Deletes every message of a session, returning how many were removed.
    async fn delete_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<u64, WorkflowError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &TaskId) -> Result<Task, WorkflowError>;

    /// Tasks of a session, newest first.
    async fn find_by_session_id(
        &self,
        ctx: &Context,
        session_id: &SessionId,
    ) -> Result<Vec<Task>, WorkflowError>;

    /// Persists status, output, error and `updated_at`.
    async fn update(&self, ctx: &Context, task: &Task) -> Result<(), WorkflowError>;

    async fn delete(&self, ctx: &Context, id: &TaskId) -> Result<(), WorkflowError>;
}

#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn create(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &SkillId) -> Result<Skill, WorkflowError>;

    async fn find_by_name(&self, ctx: &Context, name: &str) -> Result<Skill, WorkflowError>;

    /// All skills ordered by name.
    async fn list(&self, ctx: &Context) -> Result<Vec<Skill>, WorkflowError>;

    /// Persists version, location, permissions and metadata.
    async fn update(&self, ctx: &Context, skill: &Skill) -> Result<(), WorkflowError>;

    /// Deletes the skill together with its schedules.
    async fn delete(&self, ctx: &Context, id: &SkillId) -> Result<(), WorkflowError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &ScheduleId)
    -> Result<Schedule, WorkflowError>;

    /// Schedules bound to the named skill.
    async fn find_by_skill(&self, ctx: &Context, skill: &str)
    -> Result<Vec<Schedule>, WorkflowError>;

    async fn list(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError>;

    async fn find_enabled(&self, ctx: &Context) -> Result<Vec<Schedule>, WorkflowError>;

    /// Persists cron expression, input and enabled flag.
    async fn update(&self, ctx: &Context, schedule: &Schedule) -> Result<(), WorkflowError>;

    async fn delete(&self, ctx: &Context, id: &ScheduleId) -> Result<(), WorkflowError>;
}

/// Log listings are newest first and capped at `limit` rows.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn create(&self, ctx: &Context, log: &Log) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, ctx: &Context, id: &LogId) -> Result<Log, WorkflowError>;

    async fn find_by_level(
        &self,
        ctx: &Context,
        level: LogLevel,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError>;

    async fn find_by_source(
        &self,
        ctx: &Context,
        source: &str,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError>;

    /// Records with `from <= created_at <= to`.
    async fn find_by_date_range(
        &self,
        ctx: &Context,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Log>, WorkflowError>;

    async fn count_by_level(&self, ctx: &Context, level: LogLevel) -> Result<u64, WorkflowError>;

    /// Deletes records created strictly before `cutoff`, returning the count.
    async fn delete_older_than(
        &self,
        ctx: &Context,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, WorkflowError>;

    async fn delete(&self, ctx: &Context, id: &LogId) -> Result<(), WorkflowError>;
}

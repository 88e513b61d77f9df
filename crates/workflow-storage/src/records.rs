// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-side representations of the domain entities.
//!
//! Records mirror the table columns one to one: identifiers, enums and
//! timestamps are plain text, nullable columns are `Option<String>`, and
//! `schedules.enabled` is an integer. Both backends read into and write from
//! these types; conversion to entities lives in [`crate::mappers`].

/// `users` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub channel: String,
    pub channel_user_id: String,
    pub created_at: String,
}

/// `sessions` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `messages` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// `tasks` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub session_id: String,
    pub skill: String,
    pub input: String,
    pub output: Option<String>,
    pub status: String,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `skills` row. `permissions` and `metadata` hold JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub location: String,
    pub permissions: String,
    pub metadata: String,
    pub created_at: String,
}

/// `schedules` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecord {
    pub id: String,
    pub skill: String,
    pub cron_expression: String,
    pub input: String,
    pub enabled: i64,
    pub created_at: String,
}

/// `logs` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub id: String,
    pub level: String,
    pub source: String,
    pub message: String,
    pub metadata: Option<String>,
    pub created_at: String,
}

// Column lists shared by both backends. Order matches the record fields.
pub(crate) const USER_COLUMNS: &str = "id, channel, channel_user_id, created_at";
pub(crate) const SESSION_COLUMNS: &str = "id, user_id, created_at, updated_at";
pub(crate) const MESSAGE_COLUMNS: &str = "id, session_id, role, content, created_at";
pub(crate) const TASK_COLUMNS: &str =
    "id, session_id, skill, input, output, status, error, created_at, updated_at";
pub(crate) const SKILL_COLUMNS: &str =
    "id, name, version, location, permissions, metadata, created_at";
pub(crate) const SCHEDULE_COLUMNS: &str = "id, skill, cron_expression, input, enabled, created_at";
pub(crate) const LOG_COLUMNS: &str = "id, level, source, message, metadata, created_at";

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversions between domain entities and storage records.
//!
//! Conventions shared by every entity:
//!
//! - Timestamps are RFC 3339 text with nanosecond precision in UTC, so the
//!   lexical order of the column equals time order. Unparseable text reads
//!   back as the Unix epoch and logs a warning; callers must tolerate it.
//! - Optional text (`tasks.output`, `tasks.error`, `logs.metadata`) maps the
//!   empty domain string to `NULL` and back. "Present but empty" and
//!   "absent" are the same value.
//! - `schedules.enabled` is `0`/`1`; any non-zero value reads as enabled.
//! - Identifiers and enums are re-validated on the way in, so a corrupt row
//!   surfaces as a validation error instead of an invalid entity.
//!
//! The `_opt` variants lift each conversion over `Option`: `None` maps to
//! `None`, never to a default entity.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::warn;
use workflow_core::{
    CronExpression, Log, Message, Schedule, Session, Skill, Task, User, Version, WorkflowError,
};

use crate::records::{
    LogRecord, MessageRecord, ScheduleRecord, SessionRecord, SkillRecord, TaskRecord, UserRecord,
};

/// Renders a timestamp for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses a stored timestamp, falling back to the Unix epoch.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            warn!(value = raw, error = %e, "unparseable stored timestamp, using epoch");
            DateTime::<Utc>::default()
        }
    }
}

fn nullable(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn from_nullable(value: Option<String>) -> String {
    value.unwrap_or_default()
}

pub fn user_to_row(user: &User) -> UserRecord {
    UserRecord {
        id: user.id().to_string(),
        channel: user.channel().to_string(),
        channel_user_id: user.channel_id().to_string(),
        created_at: format_timestamp(user.created_at()),
    }
}

pub fn user_from_row(row: UserRecord) -> Result<User, WorkflowError> {
    Ok(User::from_parts(
        row.id.parse()?,
        row.channel.parse()?,
        row.channel_user_id,
        parse_timestamp(&row.created_at),
    ))
}

pub fn session_to_row(session: &Session) -> SessionRecord {
    SessionRecord {
        id: session.id().to_string(),
        user_id: session.user_id().to_string(),
        created_at: format_timestamp(session.created_at()),
        updated_at: format_timestamp(session.updated_at()),
    }
}

pub fn session_from_row(row: SessionRecord) -> Result<Session, WorkflowError> {
    Ok(Session::from_parts(
        row.id.parse()?,
        row.user_id.parse()?,
        parse_timestamp(&row.created_at),
        parse_timestamp(&row.updated_at),
    ))
}

pub fn message_to_row(message: &Message) -> MessageRecord {
    MessageRecord {
        id: message.id().to_string(),
        session_id: message.session_id().to_string(),
        role: message.role().to_string(),
        content: message.content().to_string(),
        created_at: format_timestamp(message.created_at()),
    }
}

pub fn message_from_row(row: MessageRecord) -> Result<Message, WorkflowError> {
    Ok(Message::from_parts(
        row.id.parse()?,
        row.session_id.parse()?,
        row.role.parse()?,
        row.content,
        parse_timestamp(&row.created_at),
    ))
}

pub fn task_to_row(task: &Task) -> TaskRecord {
    TaskRecord {
        id: task.id().to_string(),
        session_id: task.session_id().to_string(),
        skill: task.skill().to_string(),
        input: task.input().to_string(),
        output: nullable(task.output()),
        status: task.status().to_string(),
        error: nullable(task.error()),
        created_at: format_timestamp(task.created_at()),
        updated_at: format_timestamp(task.updated_at()),
    }
}

pub fn task_from_row(row: TaskRecord) -> Result<Task, WorkflowError> {
    Ok(Task::from_parts(
        row.id.parse()?,
        row.session_id.parse()?,
        row.skill,
        row.input,
        from_nullable(row.output),
        row.status.parse()?,
        from_nullable(row.error),
        parse_timestamp(&row.created_at),
        parse_timestamp(&row.updated_at),
    ))
}

pub fn skill_to_row(skill: &Skill) -> SkillRecord {
    SkillRecord {
        id: skill.id().to_string(),
        name: skill.name().to_string(),
        version: skill.version().to_string(),
        location: skill.location().to_string(),
        permissions: Value::from(skill.permissions().to_vec()).to_string(),
        metadata: Value::Object(skill.metadata().clone()).to_string(),
        created_at: format_timestamp(skill.created_at()),
    }
}

pub fn skill_from_row(row: SkillRecord) -> Result<Skill, WorkflowError> {
    let permissions: Vec<String> = parse_json("permissions", &row.permissions, "[]")?;
    let metadata: Map<String, Value> = parse_json("metadata", &row.metadata, "{}")?;
    Ok(Skill::from_parts(
        row.id.parse()?,
        row.name,
        Version::new(&row.version)?,
        row.location,
        permissions,
        metadata,
        parse_timestamp(&row.created_at),
    ))
}

/// Decodes a JSON column; an empty column reads as `empty`.
fn parse_json<T: serde::de::DeserializeOwned>(
    field: &'static str,
    raw: &str,
    empty: &str,
) -> Result<T, WorkflowError> {
    let raw = if raw.trim().is_empty() { empty } else { raw };
    serde_json::from_str(raw)
        .map_err(|e| WorkflowError::validation(field, format!("malformed stored JSON: {e}")))
}

pub fn schedule_to_row(schedule: &Schedule) -> ScheduleRecord {
    ScheduleRecord {
        id: schedule.id().to_string(),
        skill: schedule.skill().to_string(),
        cron_expression: schedule.cron().to_string(),
        input: schedule.input().to_string(),
        enabled: i64::from(schedule.is_enabled()),
        created_at: format_timestamp(schedule.created_at()),
    }
}

pub fn schedule_from_row(row: ScheduleRecord) -> Result<Schedule, WorkflowError> {
    Ok(Schedule::from_parts(
        row.id.parse()?,
        row.skill,
        CronExpression::new(&row.cron_expression)?,
        row.input,
        row.enabled != 0,
        parse_timestamp(&row.created_at),
    ))
}

pub fn log_to_row(log: &Log) -> LogRecord {
    LogRecord {
        id: log.id().to_string(),
        level: log.level().to_string(),
        source: log.source().to_string(),
        message: log.message().to_string(),
        metadata: nullable(log.metadata()),
        created_at: format_timestamp(log.created_at()),
    }
}

pub fn log_from_row(row: LogRecord) -> Result<Log, WorkflowError> {
    Ok(Log::from_parts(
        row.id.parse()?,
        row.level.parse()?,
        row.source,
        row.message,
        from_nullable(row.metadata),
        parse_timestamp(&row.created_at),
    ))
}

macro_rules! option_liftings {
    ($($entity:ty, $record:ty, $to:ident, $from:ident, $to_opt:ident, $from_opt:ident;)*) => {
        $(
            pub fn $to_opt(entity: Option<&$entity>) -> Option<$record> {
                entity.map($to)
            }

            pub fn $from_opt(row: Option<$record>) -> Result<Option<$entity>, WorkflowError> {
                row.map($from).transpose()
            }
        )*
    };
}

option_liftings! {
    User, UserRecord, user_to_row, user_from_row, user_to_row_opt, user_from_row_opt;
    Session, SessionRecord, session_to_row, session_from_row, session_to_row_opt, session_from_row_opt;
    Message, MessageRecord, message_to_row, message_from_row, message_to_row_opt, message_from_row_opt;
    Task, TaskRecord, task_to_row, task_from_row, task_to_row_opt, task_from_row_opt;
    Skill, SkillRecord, skill_to_row, skill_from_row, skill_to_row_opt, skill_from_row_opt;
    Schedule, ScheduleRecord, schedule_to_row, schedule_from_row, schedule_to_row_opt, schedule_from_row_opt;
    Log, LogRecord, log_to_row, log_from_row, log_to_row_opt, log_from_row_opt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use workflow_core::{Channel, LogLevel, MessageRole, SessionId, TaskStatus, UserId};

    #[test]
    fn none_maps_to_none() {
        assert!(user_to_row_opt(None).is_none());
        assert!(user_from_row_opt(None).unwrap().is_none());
        assert!(task_from_row_opt(None).unwrap().is_none());
        assert!(log_to_row_opt(None).is_none());
    }

    #[test]
    fn some_maps_through() {
        let user = User::new(Channel::Discord, "d-1");
        let row = user_to_row_opt(Some(&user)).unwrap();
        assert_eq!(user_from_row_opt(Some(row)).unwrap(), Some(user));
    }

    #[test]
    fn timestamps_keep_nanoseconds_and_sort_lexically() {
        let a = workflow_core::clock::now();
        let b = workflow_core::clock::now();
        let (sa, sb) = (format_timestamp(a), format_timestamp(b));
        assert!(sa.ends_with('Z'));
        assert!(sa < sb);
        assert_eq!(parse_timestamp(&sa), a);
    }

    #[test]
    fn bad_timestamp_reads_as_epoch() {
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
        assert_eq!(parse_timestamp(""), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn task_optional_fields_map_to_null() {
        let task = Task::new(SessionId::must_new("sess1"), "echo", r#"{"x":1}"#);
        let row = task_to_row(&task);
        assert_eq!(row.output, None);
        assert_eq!(row.error, None);
        assert_eq!(row.status, "pending");
        assert_eq!(task_from_row(row).unwrap(), task);
    }

    #[test]
    fn completed_task_round_trips() {
        let mut task = Task::new(SessionId::must_new("sess1"), "echo", r#"{"x":1}"#);
        task.set_running().unwrap();
        task.set_completed(r#"{"y":2}"#).unwrap();
        let row = task_to_row(&task);
        assert_eq!(row.output.as_deref(), Some(r#"{"y":2}"#));
        assert_eq!(row.error, None);
        assert_eq!(row.status, "completed");
        let back = task_from_row(row).unwrap();
        assert_eq!(back, task);
        assert_eq!(back.status(), TaskStatus::Completed);
    }

    #[test]
    fn empty_metadata_collapses_to_null() {
        let log = Log::new(LogLevel::Info, "api", "hi").with_metadata("");
        assert_eq!(log_to_row(&log).metadata, None);
    }

    #[test]
    fn enabled_flag_is_an_integer() {
        let mut schedule = Schedule::new("echo", CronExpression::new("0 * * * *").unwrap(), "{}");
        assert_eq!(schedule_to_row(&schedule).enabled, 1);
        schedule.disable();
        let mut row = schedule_to_row(&schedule);
        assert_eq!(row.enabled, 0);
        row.enabled = 7;
        assert!(schedule_from_row(row).unwrap().is_enabled());
    }

    #[test]
    fn skill_json_round_trips() {
        let Value::Object(meta) = json!({"author": "ops", "tags": ["a", "b"]}) else {
            unreachable!()
        };
        let skill = Skill::new(
            "echo",
            Version::new("1.2.3").unwrap(),
            "/skills/echo.wasm",
            vec!["net".into(), "fs:read".into()],
            meta,
        );
        let row = skill_to_row(&skill);
        assert_eq!(row.permissions, r#"["net","fs:read"]"#);
        assert_eq!(skill_from_row(row).unwrap(), skill);
    }

    #[test]
    fn corrupt_rows_are_validation_errors() {
        let mut row = user_to_row(&User::new(Channel::Web, "w"));
        row.channel = "fax".into();
        assert!(user_from_row(row).unwrap_err().is_validation());

        let mut row = message_to_row(&Message::new(
            SessionId::must_new("s"),
            MessageRole::User,
            "hi",
        ));
        row.id = String::new();
        assert!(message_from_row(row).unwrap_err().is_validation());

        let mut row = skill_to_row(&Skill::new(
            "x",
            Version::new("1.0.0").unwrap(),
            "/x",
            vec![],
            Map::new(),
        ));
        row.permissions = "{not json".into();
        assert!(skill_from_row(row).unwrap_err().is_validation());

        let mut row = task_to_row(&Task::new(SessionId::must_new("s"), "x", "{}"));
        row.status = String::new();
        assert!(task_from_row(row).unwrap_err().is_validation());
    }

    fn channel() -> impl Strategy<Value = Channel> {
        prop_oneof![Just(Channel::Telegram), Just(Channel::Discord), Just(Channel::Web)]
    }

    fn level() -> impl Strategy<Value = LogLevel> {
        prop_oneof![
            Just(LogLevel::Debug),
            Just(LogLevel::Info),
            Just(LogLevel::Warn),
            Just(LogLevel::Error)
        ]
    }

    proptest! {
        #[test]
        fn users_round_trip(channel in channel(), channel_id in "\\PC{0,20}") {
            let user = User::new(channel, channel_id);
            prop_assert_eq!(user_from_row(user_to_row(&user)).unwrap(), user);
        }

        #[test]
        fn sessions_round_trip(owner in "[A-Za-z0-9_-]{1,16}", touches in 0usize..4) {
            let mut session = Session::new(UserId::new(owner).unwrap());
            for _ in 0..touches {
                session.touch();
            }
            prop_assert_eq!(session_from_row(session_to_row(&session)).unwrap(), session);
        }

        #[test]
        fn logs_round_trip(level in level(), source in "[a-z]{0,8}", metadata in "\\PC{0,16}") {
            let log = Log::new(level, source, "message").with_metadata(metadata);
            prop_assert_eq!(log_from_row(log_to_row(&log)).unwrap(), log);
        }
    }
}

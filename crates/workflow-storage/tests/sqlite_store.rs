// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository behaviour against a migrated SQLite file.

use std::time::Duration;

use chrono::TimeDelta;
use serde_json::{Map, json};
use tempfile::TempDir;
use workflow_config::DatabaseConfig;
use workflow_core::{
    Channel, Context, CronExpression, ErrorKind, Log, LogLevel, Message, MessageRole, Schedule,
    Session, SessionId, Skill, Task, TaskStatus, User, UserId, Version,
};
use workflow_storage::{Store, bundled_migrations_dir};

async fn open_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflow.db");
    let mut config = DatabaseConfig::sqlite(path.to_str().unwrap());
    config.migrations_path = bundled_migrations_dir().display().to_string();
    let store = Store::open(&config).await.unwrap();
    let report = store.migrate_up(&Context::background()).await.unwrap();
    assert_eq!(report.applied.len(), 2);
    (dir, store)
}

async fn user_with_session(store: &Store, ctx: &Context) -> (User, Session) {
    let user = User::new(Channel::Telegram, "u1");
    store.users().create(ctx, &user).await.unwrap();
    let session = Session::new(user.id().clone());
    store.sessions().create(ctx, &session).await.unwrap();
    (user, session)
}

fn skill(name: &str) -> Skill {
    Skill::new(
        name,
        Version::new("1.0.0").unwrap(),
        format!("/skills/{name}.wasm"),
        vec!["net".to_string()],
        Map::new(),
    )
}

#[tokio::test]
async fn user_lookup_by_channel_and_duplicate_identity() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let user = User::new(Channel::Telegram, "u1");
    store.users().create(&ctx, &user).await.unwrap();

    let found = store
        .users()
        .find_by_channel(&ctx, Channel::Telegram, "u1")
        .await
        .unwrap();
    assert_eq!(found.id(), user.id());
    assert_eq!(found, user);

    let err = store
        .users()
        .create(&ctx, &User::new(Channel::Telegram, "u1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Same platform id on another channel is a different identity.
    store
        .users()
        .create(&ctx, &User::new(Channel::Discord, "u1"))
        .await
        .unwrap();
    assert_eq!(store.users().list(&ctx).await.unwrap().len(), 2);
}

#[tokio::test]
async fn access_follows_session_ownership() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (user, session) = user_with_session(&store, &ctx).await;
    let access = store.access_service();

    assert!(access.can_access(&ctx, user.id(), session.id()).await);
    assert!(
        !access
            .can_access(&ctx, &UserId::must_new("u2"), session.id())
            .await
    );
    assert!(
        !access
            .can_access(&ctx, user.id(), &SessionId::must_new("missing"))
            .await
    );
    let err = access
        .ensure_access(&ctx, &UserId::must_new("u2"), session.id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);
}

#[tokio::test]
async fn messages_come_back_in_creation_order() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (_user, session) = user_with_session(&store, &ctx).await;

    let hi = Message::new(session.id().clone(), MessageRole::User, "hi");
    let hello = Message::new(session.id().clone(), MessageRole::Assistant, "hello");
    store.messages().create(&ctx, &hi).await.unwrap();
    store.messages().create(&ctx, &hello).await.unwrap();

    let messages = store
        .messages()
        .find_by_session_id(&ctx, session.id())
        .await
        .unwrap();
    let contents: Vec<&str> = messages.iter().map(Message::content).collect();
    assert_eq!(contents, ["hi", "hello"]);
    assert!(messages[0].is_from_user());

    let removed = store
        .messages()
        .delete_by_session_id(&ctx, session.id())
        .await
        .unwrap();
    assert_eq!(removed, 2);
}

#[tokio::test]
async fn completed_task_is_persisted_with_output_only() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (_user, session) = user_with_session(&store, &ctx).await;

    let mut task = Task::new(session.id().clone(), "echo", r#"{"x":1}"#);
    store.tasks().create(&ctx, &task).await.unwrap();
    task.set_running().unwrap();
    task.set_completed(r#"{"y":2}"#).unwrap();
    store.tasks().update(&ctx, &task).await.unwrap();

    let stored = store.tasks().find_by_id(&ctx, task.id()).await.unwrap();
    assert_eq!(stored.status(), TaskStatus::Completed);
    assert_eq!(stored.output(), Some(r#"{"y":2}"#));
    assert_eq!(stored.error(), None);
    assert!(stored.is_terminal());
    assert_eq!(stored, task);
}

#[tokio::test]
async fn tasks_list_newest_first() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (_user, session) = user_with_session(&store, &ctx).await;

    let first = Task::new(session.id().clone(), "echo", "{}");
    let second = Task::new(session.id().clone(), "echo", "{}");
    store.tasks().create(&ctx, &first).await.unwrap();
    store.tasks().create(&ctx, &second).await.unwrap();

    let tasks = store
        .tasks()
        .find_by_session_id(&ctx, session.id())
        .await
        .unwrap();
    assert_eq!(tasks[0].id(), second.id());
    assert_eq!(tasks[1].id(), first.id());
}

#[tokio::test]
async fn deleting_a_user_cascades() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (user, session) = user_with_session(&store, &ctx).await;
    let message = Message::new(session.id().clone(), MessageRole::User, "hi");
    let task = Task::new(session.id().clone(), "echo", "{}");
    store.messages().create(&ctx, &message).await.unwrap();
    store.tasks().create(&ctx, &task).await.unwrap();

    store.users().delete(&ctx, user.id()).await.unwrap();

    assert!(store.sessions().find_by_id(&ctx, session.id()).await.unwrap_err().is_not_found());
    assert!(store.messages().find_by_id(&ctx, message.id()).await.unwrap_err().is_not_found());
    assert!(store.tasks().find_by_id(&ctx, task.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn session_touch_is_persisted() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let (user, mut session) = user_with_session(&store, &ctx).await;
    let before = session.updated_at();
    session.touch();
    store.sessions().update(&ctx, &session).await.unwrap();

    let stored = store.sessions().find_by_id(&ctx, session.id()).await.unwrap();
    assert!(stored.updated_at() > before);
    let owned = store.sessions().find_by_user_id(&ctx, user.id()).await.unwrap();
    assert_eq!(owned, vec![stored]);
}

#[tokio::test]
async fn skills_are_unique_and_deleting_one_removes_its_schedules() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let echo = skill("echo");
    store.skills().create(&ctx, &echo).await.unwrap();
    store.skills().create(&ctx, &skill("alpha")).await.unwrap();

    let err = store.skills().create(&ctx, &skill("echo")).await.unwrap_err();
    assert!(err.is_conflict());

    let names: Vec<String> = store
        .skills()
        .list(&ctx)
        .await
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, ["alpha", "echo"]);

    let schedule = Schedule::new("echo", CronExpression::new("*/5 * * * *").unwrap(), "{}");
    store.schedules().create(&ctx, &schedule).await.unwrap();
    assert_eq!(store.schedules().find_by_skill(&ctx, "echo").await.unwrap().len(), 1);

    store.skills().delete(&ctx, echo.id()).await.unwrap();
    assert!(store.schedules().find_by_id(&ctx, schedule.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn skill_update_keeps_json_fields() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let mut echo = skill("echo");
    store.skills().create(&ctx, &echo).await.unwrap();

    let serde_json::Value::Object(meta) = json!({"owner": "ops"}) else {
        unreachable!()
    };
    echo.update(
        Version::new("1.1.0").unwrap(),
        "/skills/echo-1.1.wasm",
        vec!["net".into(), "fs:read".into()],
        meta,
    );
    store.skills().update(&ctx, &echo).await.unwrap();

    let stored = store.skills().find_by_name(&ctx, "echo").await.unwrap();
    assert_eq!(stored, echo);
    assert!(stored.has_permission("fs:read"));
}

#[tokio::test]
async fn schedule_for_unknown_skill_is_rejected() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let schedule = Schedule::new("ghost", CronExpression::new("0 * * * *").unwrap(), "{}");
    let err = store.schedules().create(&ctx, &schedule).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn enabled_schedules_and_updates() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    store.skills().create(&ctx, &skill("echo")).await.unwrap();

    let on = Schedule::new("echo", CronExpression::new("0 * * * *").unwrap(), "{}");
    let mut off = Schedule::new("echo", CronExpression::new("0 9 * * 1-5").unwrap(), "{}");
    store.schedules().create(&ctx, &on).await.unwrap();
    store.schedules().create(&ctx, &off).await.unwrap();

    off.disable();
    off.set_input(r#"{"quiet":true}"#);
    store.schedules().update(&ctx, &off).await.unwrap();

    let enabled = store.schedules().find_enabled(&ctx).await.unwrap();
    assert_eq!(enabled, vec![on]);
    let stored = store.schedules().find_by_id(&ctx, off.id()).await.unwrap();
    assert_eq!(stored, off);
    assert_eq!(store.schedules().list(&ctx).await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let ghost = Task::new(SessionId::must_new("nope"), "echo", "{}");

    assert!(store.tasks().update(&ctx, &ghost).await.unwrap_err().is_not_found());
    assert!(store.tasks().delete(&ctx, ghost.id()).await.unwrap_err().is_not_found());
    assert!(store.users().delete(&ctx, &UserId::must_new("nope")).await.unwrap_err().is_not_found());
    assert!(
        store
            .users()
            .find_by_channel(&ctx, Channel::Web, "nope")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(store.skills().find_by_name(&ctx, "nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn log_queries() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let logs = store.logs();

    let mut written = Vec::new();
    for (level, source) in [
        (LogLevel::Info, "api"),
        (LogLevel::Error, "api"),
        (LogLevel::Info, "worker"),
        (LogLevel::Info, "api"),
    ] {
        let log = Log::new(level, source, "event").with_metadata(r#"{"n":1}"#);
        logs.create(&ctx, &log).await.unwrap();
        written.push(log);
    }

    let info = logs.find_by_level(&ctx, LogLevel::Info, 10).await.unwrap();
    assert_eq!(info.len(), 3);
    assert_eq!(info[0].id(), written[3].id());
    assert_eq!(logs.find_by_level(&ctx, LogLevel::Info, 2).await.unwrap().len(), 2);
    assert!(logs.find_by_level(&ctx, LogLevel::Info, 0).await.unwrap().is_empty());
    assert_eq!(logs.find_by_source(&ctx, "api", 10).await.unwrap().len(), 3);
    assert_eq!(logs.count_by_level(&ctx, LogLevel::Info).await.unwrap(), 3);
    assert_eq!(logs.count_by_level(&ctx, LogLevel::Debug).await.unwrap(), 0);

    let range = logs
        .find_by_date_range(&ctx, written[1].created_at(), written[2].created_at(), 10)
        .await
        .unwrap();
    let ids: Vec<_> = range.iter().map(|l| l.id().clone()).collect();
    assert_eq!(ids, vec![written[2].id().clone(), written[1].id().clone()]);

    let removed = logs
        .delete_older_than(&ctx, written[2].created_at())
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(logs.find_by_id(&ctx, written[2].id()).await.is_ok());
    assert_eq!(
        logs.find_by_id(&ctx, written[0].id()).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    let future = written[3].created_at() + TimeDelta::days(1);
    assert_eq!(logs.delete_older_than(&ctx, future).await.unwrap(), 2);
}

#[tokio::test]
async fn db_logger_filters_below_threshold() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let logger = store.logger("scheduler", LogLevel::Warn);

    assert!(logger.info(&ctx, "tick").await.unwrap().is_none());
    let stored = logger.error(&ctx, "boom").await.unwrap().unwrap();
    let found = store.logs().find_by_id(&ctx, stored.id()).await.unwrap();
    assert_eq!(found.source(), "scheduler");
    assert_eq!(store.logs().count_by_level(&ctx, LogLevel::Info).await.unwrap(), 0);
}

#[tokio::test]
async fn user_directory_resolves_once() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let directory = store.user_directory();

    let first = directory.resolve(&ctx, Channel::Web, "browser-1").await.unwrap();
    let second = directory.resolve(&ctx, Channel::Web, "browser-1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.users().list(&ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_context_writes_nothing() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    let cancelled = ctx.child();
    cancelled.cancel();

    let user = User::new(Channel::Web, "w1");
    let err = store.users().create(&cancelled, &user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(store.users().find_by_id(&ctx, user.id()).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn write_blocked_past_its_deadline_still_reports_the_commit() {
    let (dir, store) = open_store().await;
    let ctx = Context::background();
    let path = dir.path().join("workflow.db");

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let holder = std::thread::spawn(move || {
        let mut conn = rusqlite::Connection::open(path).unwrap();
        let tx = conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Exclusive)
            .unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        tx.commit().unwrap();
    });
    locked_rx.recv().unwrap();

    let user = User::new(Channel::Web, "w-slow");
    let created = store
        .users()
        .create(&ctx.with_timeout(Duration::from_millis(50)), &user)
        .await;
    holder.join().unwrap();

    created.unwrap();
    assert_eq!(store.users().find_by_id(&ctx, user.id()).await.unwrap(), user);
}

#[tokio::test]
async fn migrations_are_idempotent_and_reversible() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();

    assert!(store.migrate_up(&ctx).await.unwrap().is_noop());

    let report = store.rollback_one(&ctx).await.unwrap();
    assert_eq!(report.reverted, vec![(2, "indexes".to_string())]);
    let status = store.migration_status(&ctx).await.unwrap();
    assert!(status[0].is_applied());
    assert!(!status[1].is_applied());

    let report = store.migrate_up(&ctx).await.unwrap();
    assert_eq!(report.applied, vec![(2, "indexes".to_string())]);
}

#[tokio::test]
async fn health_check_and_close() {
    let (_dir, store) = open_store().await;
    let ctx = Context::background();
    store.health_check(&ctx).await.unwrap();
    store.close().await.unwrap();
    assert_eq!(store.health_check(&ctx).await.unwrap_err().kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn unknown_backend_is_a_config_error() {
    let mut config = DatabaseConfig::sqlite("/tmp/never-opened.db");
    config.backend = Some("oracle".to_string());
    let err = Store::open(&config).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains(r#"unknown database type "oracle""#));
}

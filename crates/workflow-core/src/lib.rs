// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the workflow engine persistence layer.
//!
//! This crate holds everything that is independent of a storage backend:
//! validated value objects, domain entities, repository contracts, the
//! cancellation context, and the services composed over the repositories.
//! Backends live in `workflow-storage`.

pub mod clock;
pub mod context;
pub mod domain;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::Context;
pub use domain::{Log, Message, Schedule, Session, Skill, Task, User};
pub use error::{ErrorKind, WorkflowError};
pub use services::{DbLogger, SessionAccessService, UserDirectory};
pub use types::{
    Channel, CronExpression, CronField, LogId, LogLevel, MessageId, MessageRole, ScheduleId,
    SessionId, SkillId, TaskId, TaskStatus, UserId, Version,
};

// Re-export all repository and connector traits at crate root.
pub use traits::{
    ChannelConnector, IncomingMessage, LogRepository, MessageRepository, OutgoingResponse,
    ScheduleRepository, SessionRepository, SkillRepository, TaskRepository, UserRepository,
};

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value objects: typed identifiers, closed enumerations, cron expressions,
//! and semantic versions.
//!
//! Every value object validates on construction and re-validates on
//! deserialization, so a value that exists is structurally sound.

pub mod cron;
pub mod enums;
pub mod ids;
pub mod version;

pub use cron::{CronExpression, CronField};
pub use enums::{Channel, LogLevel, MessageRole, TaskStatus};
pub use ids::{LogId, MessageId, ScheduleId, SessionId, SkillId, TaskId, UserId};
pub use version::Version;

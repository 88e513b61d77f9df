// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities.
//!
//! Entities are plain values: constructors assign a fresh id and a timestamp
//! from the monotonic clock, mutators adjust fields in memory, and nothing
//! here touches storage. Persistence is always an explicit repository call.
//! Each entity also has a `from_parts` constructor used when rehydrating rows.

pub mod log;
pub mod message;
pub mod schedule;
pub mod session;
pub mod skill;
pub mod task;
pub mod user;

pub use log::Log;
pub use message::Message;
pub use schedule::Schedule;
pub use session::Session;
pub use skill::Skill;
pub use task::Task;
pub use user::User;

/// Maps the empty string to `None`.
///
/// Optional text fields collapse "present but empty" into "absent".
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

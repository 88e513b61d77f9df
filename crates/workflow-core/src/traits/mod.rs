// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the persistence and connector seams.
//!
//! All traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped per backend.

pub mod channel;
pub mod repository;

pub use channel::{ChannelConnector, IncomingMessage, OutgoingResponse};
pub use repository::{
    LogRepository, MessageRepository, ScheduleRepository, SessionRepository, SkillRepository,
    TaskRepository, UserRepository,
};

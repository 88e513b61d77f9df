// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Skill execution tasks and their lifecycle.
//!
//! ```text
//! Pending ──► Running ──► Completed
//!    │           │
//!    └───────────┴──────► Failed
//! ```
//!
//! Completed and Failed are terminal. `output` is set only on completion and
//! `error` only on failure; the other is cleared by the transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::domain::non_empty;
use crate::error::WorkflowError;
use crate::types::{SessionId, TaskId, TaskStatus};

/// A single invocation of a skill within a session.
///
/// Deserializing goes through the same lifecycle check as the mutators, so
/// a payload such as a pending task carrying output is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskFields")]
pub struct Task {
    id: TaskId,
    session_id: SessionId,
    skill: String,
    input: String,
    output: String,
    status: TaskStatus,
    error: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Unchecked wire form of [`Task`].
#[derive(Deserialize)]
struct TaskFields {
    id: TaskId,
    session_id: SessionId,
    skill: String,
    input: String,
    output: String,
    status: TaskStatus,
    error: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskFields> for Task {
    type Error = WorkflowError;

    fn try_from(fields: TaskFields) -> Result<Self, WorkflowError> {
        let task = Task::from_parts(
            fields.id,
            fields.session_id,
            fields.skill,
            fields.input,
            fields.output,
            fields.status,
            fields.error,
            fields.created_at,
            fields.updated_at,
        );
        task.check_lifecycle()?;
        Ok(task)
    }
}

impl Task {
    /// A new pending task.
    pub fn new(session_id: SessionId, skill: impl Into<String>, input: impl Into<String>) -> Self {
        let now = clock::now();
        Self {
            id: TaskId::generate(),
            session_id,
            skill: skill.into(),
            input: input.into(),
            output: String::new(),
            status: TaskStatus::Pending,
            error: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a stored task. Empty `output`/`error` mean absent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TaskId,
        session_id: SessionId,
        skill: String,
        input: String,
        output: String,
        status: TaskStatus,
        error: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            skill,
            input,
            output,
            status,
            error,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Name of the skill to execute.
    pub fn skill(&self) -> &str {
        &self.skill
    }

    /// Opaque JSON payload handed to the skill.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> Option<&str> {
        non_empty(&self.output)
    }

    pub fn error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn belongs_to_session(&self, session_id: &SessionId) -> bool {
        &self.session_id == session_id
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `Pending → Running`.
    pub fn set_running(&mut self) -> Result<(), WorkflowError> {
        self.transition(TaskStatus::Running)?;
        Ok(())
    }

    /// `Running → Completed`, recording `output` and clearing any error.
    pub fn set_completed(&mut self, output: impl Into<String>) -> Result<(), WorkflowError> {
        self.transition(TaskStatus::Completed)?;
        self.output = output.into();
        self.error.clear();
        Ok(())
    }

    /// `Pending | Running → Failed`, recording `error` and clearing any output.
    pub fn set_failed(&mut self, error: impl Into<String>) -> Result<(), WorkflowError> {
        self.transition(TaskStatus::Failed)?;
        self.error = error.into();
        self.output.clear();
        Ok(())
    }

    /// Output only on Completed, error only on Failed.
    fn check_lifecycle(&self) -> Result<(), WorkflowError> {
        if !self.output.is_empty() && self.status != TaskStatus::Completed {
            return Err(WorkflowError::validation(
                "output",
                format!("a {} task has no output", self.status),
            ));
        }
        if !self.error.is_empty() && self.status != TaskStatus::Failed {
            return Err(WorkflowError::validation(
                "error",
                format!("a {} task has no error", self.status),
            ));
        }
        Ok(())
    }

    /// Moves to `next` if the edge is legal. An illegal edge leaves the task untouched.
    fn transition(&mut self, next: TaskStatus) -> Result<(), WorkflowError> {
        if !self.status.can_transition_to(next) {
            return Err(WorkflowError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = clock::after(self.updated_at);
        Ok(())
    }
}

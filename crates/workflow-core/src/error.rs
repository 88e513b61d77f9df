// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the workflow engine persistence layer.

use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::types::TaskStatus;

/// Stable category tag for a [`WorkflowError`].
///
/// Callers branch on the kind rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Backend,
    AccessDenied,
    Cancelled,
    DeadlineExceeded,
    Config,
}

/// The error type used across value objects, repositories, and services.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// An identifier was constructed from an empty string.
    #[error("validation error: {kind} must not be empty")]
    EmptyId { kind: &'static str },

    /// An identifier contained characters outside `[A-Za-z0-9_-]`.
    #[error("validation error: invalid {kind} `{value}`")]
    InvalidId { kind: &'static str, value: String },

    /// A value object or entity field failed structural validation.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// A task lifecycle transition that has no legal edge.
    #[error("validation error: task cannot move from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("{entity} conflict: {message}")]
    Conflict { entity: &'static str, message: String },

    /// Any other storage failure (connection, driver, constraint, I/O).
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A schema migration could not be loaded or applied.
    #[error("migration error: {message}")]
    Migration {
        version: Option<i64>,
        message: String,
    },

    /// The user does not own the session.
    #[error("access denied: user {user_id} cannot access session {session_id}")]
    AccessDenied { user_id: String, session_id: String },

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's context deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl WorkflowError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            message: message.into(),
        }
    }

    /// Storage error carrying the driver error in its source chain.
    pub fn storage<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Storage error without an underlying driver error.
    pub fn storage_msg(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn migration(version: Option<i64>, message: impl Into<String>) -> Self {
        Self::Migration {
            version,
            message: message.into(),
        }
    }

    /// The stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyId { .. }
            | Self::InvalidId { .. }
            | Self::Validation { .. }
            | Self::InvalidTransition { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage { .. } | Self::Migration { .. } => ErrorKind::Backend,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// True for `Cancelled` and `DeadlineExceeded`.
    pub fn is_cancellation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Cancelled | ErrorKind::DeadlineExceeded)
    }
}

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed identifiers.
//!
//! Each entity kind has its own newtype so a `SessionId` can never be passed
//! where a `UserId` is expected. All kinds share one validation rule:
//! non-empty and matching `^[A-Za-z0-9_-]+$`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("id pattern is a valid regex"));

/// Shared validation for every identifier kind.
fn validate_id(kind: &'static str, value: &str) -> Result<(), WorkflowError> {
    if value.is_empty() {
        return Err(WorkflowError::EmptyId { kind });
    }
    if !ID_PATTERN.is_match(value) {
        return Err(WorkflowError::InvalidId {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps `value`.
            pub fn new(value: impl Into<String>) -> Result<Self, WorkflowError> {
                let value = value.into();
                validate_id($kind, &value)?;
                Ok(Self(value))
            }

            /// Like [`new`](Self::new) but panics on invalid input.
            ///
            /// For literals whose validity is a programming invariant.
            pub fn must_new(value: impl Into<String>) -> Self {
                match Self::new(value) {
                    Ok(id) => id,
                    Err(e) => panic!("{e}"),
                }
            }

            /// A fresh random identifier (UUID v4, hyphenated).
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = WorkflowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = WorkflowError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id!(
    /// Identifies a user across all channels.
    UserId,
    "user id"
);
define_id!(
    /// Identifies a conversation session.
    SessionId,
    "session id"
);
define_id!(
    /// Identifies a skill execution task.
    TaskId,
    "task id"
);
define_id!(
    /// Identifies a single message in a session.
    MessageId,
    "message id"
);
define_id!(
    /// Identifies a registered skill.
    SkillId,
    "skill id"
);
define_id!(
    /// Identifies a cron schedule.
    ScheduleId,
    "schedule id"
);
define_id!(
    /// Identifies a persisted log record.
    LogId,
    "log id"
);

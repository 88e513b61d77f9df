// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closed enumerations stored as lowercase text.
//!
//! Parsing is explicit and strict: unknown and empty literals are validation
//! errors, never silently mapped to a default variant.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::WorkflowError;

/// Looks `value` up among the variants' lowercase literals.
fn parse_closed<T>(field: &'static str, value: &str) -> Result<T, WorkflowError>
where
    T: IntoEnumIterator + Into<&'static str> + Copy,
{
    T::iter().find(|v| (*v).into() == value).ok_or_else(|| {
        let expected: Vec<&'static str> = T::iter().map(Into::into).collect();
        WorkflowError::validation(
            field,
            format!("`{value}` is not one of {}", expected.join(", ")),
        )
    })
}

macro_rules! closed_enum_conversions {
    ($name:ident, $field:literal) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                (*self).into()
            }
        }

        impl FromStr for $name {
            type Err = WorkflowError;

            fn from_str(s: &str) -> Result<Self, WorkflowError> {
                parse_closed($field, s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = WorkflowError;

            fn try_from(value: String) -> Result<Self, WorkflowError> {
                value.parse()
            }
        }
    };
}

/// Origin platform of a user identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Channel {
    Telegram,
    Discord,
    Web,
}

closed_enum_conversions!(Channel, "channel");

/// Author of a message within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

closed_enum_conversions!(MessageRole, "role");

/// Lifecycle state of a skill execution task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

closed_enum_conversions!(TaskStatus, "status");

impl TaskStatus {
    /// Completed and failed tasks accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal edge from this state.
    ///
    /// Legal edges: pending→running, pending→failed, running→completed,
    /// running→failed.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

/// Severity of a log record, ordered `debug < info < warn < error`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

closed_enum_conversions!(LogLevel, "level");

impl LogLevel {
    pub fn priority(&self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warn => 2,
            Self::Error => 3,
        }
    }

    /// A record at this level is emitted iff its priority reaches `threshold`.
    pub fn enabled(&self, threshold: LogLevel) -> bool {
        self.priority() >= threshold.priority()
    }

    /// Alias of [`enabled`](Self::enabled) read from the logger's side.
    pub fn should_log(&self, threshold: LogLevel) -> bool {
        self.enabled(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip_through_from_str() {
        for c in Channel::iter() {
            assert_eq!(c.as_str().parse::<Channel>().unwrap(), c);
        }
        for r in MessageRole::iter() {
            assert_eq!(r.as_str().parse::<MessageRole>().unwrap(), r);
        }
        for s in TaskStatus::iter() {
            assert_eq!(s.as_str().parse::<TaskStatus>().unwrap(), s);
        }
        for l in LogLevel::iter() {
            assert_eq!(l.as_str().parse::<LogLevel>().unwrap(), l);
        }
    }

    #[test]
    fn owned_strings_convert_for_every_level() {
        assert_eq!(LogLevel::try_from("error".to_string()).unwrap(), LogLevel::Error);
        assert!(LogLevel::try_from("fatal".to_string()).unwrap_err().is_validation());
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
    }

    #[test]
    fn literals_are_lowercase() {
        assert_eq!(Channel::Telegram.as_str(), "telegram");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
    }

    #[test]
    fn unknown_and_empty_literals_are_rejected() {
        for bad in ["", "Telegram", "slack", " web"] {
            let err = bad.parse::<Channel>().unwrap_err();
            assert!(err.is_validation(), "{bad:?}");
        }
        assert!("".parse::<MessageRole>().is_err());
        assert!("tool".parse::<MessageRole>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
        assert!("cancelled".parse::<TaskStatus>().is_err());
        assert!("".parse::<LogLevel>().is_err());
        assert!("trace".parse::<LogLevel>().is_err());
        assert!("warning".parse::<LogLevel>().is_err());
    }

    #[test]
    fn serde_uses_validated_literals() {
        assert_eq!(serde_json::to_string(&TaskStatus::Running).unwrap(), "\"running\"");
        let parsed: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Failed);
        assert!(serde_json::from_str::<TaskStatus>("\"\"").is_err());
        assert!(serde_json::from_str::<Channel>("\"irc\"").is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [TaskStatus::Completed, TaskStatus::Failed] {
            for to in TaskStatus::iter() {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn legal_edges() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Running));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Failed));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Running.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Running.can_transition_to(TaskStatus::Running));
        assert!(!TaskStatus::Running.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn warn_threshold_filters_lower_levels() {
        let threshold = LogLevel::Warn;
        assert!(!LogLevel::Debug.should_log(threshold));
        assert!(!LogLevel::Info.should_log(threshold));
        assert!(LogLevel::Warn.should_log(threshold));
        assert!(LogLevel::Error.should_log(threshold));
    }
}

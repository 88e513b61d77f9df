// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Five-field cron expressions.
//!
//! Validation is structural only. Computing firing times belongs to the
//! schedule dispatcher, which lives outside this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Names and inclusive bounds of the five fields, in order.
const FIELDS: [(&str, u32, u32); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
    ("day-of-week", 0, 6),
];

/// One parsed field of a cron expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CronField {
    /// `*`
    #[default]
    Any,
    /// `*/N`, N ≥ 1. Steps past `u64::MAX` are stored as `u64::MAX`.
    Step(u64),
    /// `A-B`, A ≤ B.
    Range(u32, u32),
    /// `A,B,C`
    List(Vec<u32>),
    /// A single value.
    Value(u32),
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Step(n) => write!(f, "*/{n}"),
            Self::Range(a, b) => write!(f, "{a}-{b}"),
            Self::List(values) => {
                let parts: Vec<String> = values.iter().map(u32::to_string).collect();
                f.write_str(&parts.join(","))
            }
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// A validated `minute hour day-of-month month day-of-week` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CronExpression {
    raw: String,
    fields: [CronField; 5],
}

impl CronExpression {
    pub fn new(expr: impl AsRef<str>) -> Result<Self, WorkflowError> {
        let raw = expr.as_ref().trim();
        if raw.is_empty() {
            return Err(WorkflowError::validation("cron", "expression must not be empty"));
        }

        let parts: Vec<&str> = raw.split_whitespace().collect();
        if parts.len() != FIELDS.len() {
            return Err(WorkflowError::validation(
                "cron",
                format!("expected 5 fields, got {} in `{raw}`", parts.len()),
            ));
        }

        let mut fields: [CronField; 5] = Default::default();
        for (slot, (part, (name, min, max))) in fields.iter_mut().zip(parts.iter().zip(FIELDS)) {
            *slot = parse_field(part, name, min, max)?;
        }

        Ok(Self {
            raw: raw.to_string(),
            fields,
        })
    }

    pub fn is_valid(expr: &str) -> bool {
        Self::new(expr).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn fields(&self) -> &[CronField; 5] {
        &self.fields
    }
}

fn parse_field(part: &str, name: &str, min: u32, max: u32) -> Result<CronField, WorkflowError> {
    let invalid = |detail: String| WorkflowError::validation("cron", format!("{name}: {detail}"));

    if part == "*" {
        return Ok(CronField::Any);
    }

    if let Some(step) = part.strip_prefix("*/") {
        if !is_digits(step) {
            return Err(invalid(format!("bad step `{part}`")));
        }
        // Digits that overflow u64 saturate; the schedule is the same.
        let n = step.parse::<u64>().unwrap_or(u64::MAX);
        if n == 0 {
            return Err(invalid("step must be positive".to_string()));
        }
        return Ok(CronField::Step(n));
    }

    let in_range = |raw: &str| -> Result<u32, WorkflowError> {
        let v: u32 = parse_digits(raw).ok_or_else(|| invalid(format!("bad value `{raw}`")))?;
        if v < min || v > max {
            return Err(invalid(format!("{v} outside {min}-{max}")));
        }
        Ok(v)
    };

    if let Some((a, b)) = part.split_once('-') {
        let (a, b) = (in_range(a)?, in_range(b)?);
        if a > b {
            return Err(invalid(format!("range start {a} exceeds end {b}")));
        }
        return Ok(CronField::Range(a, b));
    }

    if part.contains(',') {
        let values = part.split(',').map(in_range).collect::<Result<Vec<_>, _>>()?;
        return Ok(CronField::List(values));
    }

    in_range(part).map(CronField::Value)
}

fn is_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a run of ASCII digits. Signs, spaces and empty input are rejected.
fn parse_digits<T: FromStr>(raw: &str) -> Option<T> {
    if !is_digits(raw) {
        return None;
    }
    raw.parse().ok()
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for CronExpression {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CronExpression {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CronExpression> for String {
    fn from(expr: CronExpression) -> Self {
        expr.raw
    }
}

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `MAJOR.MINOR.PATCH` skill versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("version pattern is a valid regex")
});

/// A strict three-component version. Pre-release and build suffixes are rejected.
///
/// The original text is kept so `"01.2.3"` renders back unchanged; ordering is
/// numeric on `(major, minor, patch)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    raw: String,
    major: u64,
    minor: u64,
    patch: u64,
}

impl Version {
    pub fn new(value: impl AsRef<str>) -> Result<Self, WorkflowError> {
        let raw = value.as_ref();
        let invalid = || {
            WorkflowError::validation("version", format!("`{raw}` is not MAJOR.MINOR.PATCH"))
        };
        let caps = VERSION_PATTERN.captures(raw).ok_or_else(invalid)?;
        let part = |i: usize| caps[i].parse::<u64>().map_err(|_| invalid());
        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
            raw: raw.to_string(),
        })
    }

    pub fn is_valid(value: &str) -> bool {
        Self::new(value).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    fn key(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

// Equality is on the stored text so a round trip through storage is exact.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Version {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_triples() {
        let v = Version::new("1.20.3").unwrap();
        assert_eq!((v.major(), v.minor(), v.patch()), (1, 20, 3));
        assert_eq!(v.to_string(), "1.20.3");
        assert!(Version::is_valid("0.0.0"));
    }

    #[test]
    fn rejects_suffixes_and_partial_versions() {
        for bad in ["", "1", "1.2", "1.2.3.4", "v1.2.3", "1.2.3-beta", "1.2.3+build", " 1.2.3", "1.x.3"] {
            assert!(!Version::is_valid(bad), "{bad:?}");
        }
    }

    #[test]
    fn orders_numerically() {
        let a = Version::new("1.9.0").unwrap();
        let b = Version::new("1.10.0").unwrap();
        assert!(a < b);
    }

    #[test]
    fn overflowing_component_is_rejected() {
        assert!(!Version::is_valid("99999999999999999999.0.0"));
    }

    #[test]
    fn serde_round_trips_as_string() {
        let v = Version::new("2.0.1").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"2.0.1\"");
        assert_eq!(serde_json::from_str::<Version>(&json).unwrap(), v);
        assert!(serde_json::from_str::<Version>("\"2.0\"").is_err());
    }
}

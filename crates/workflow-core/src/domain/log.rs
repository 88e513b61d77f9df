// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::domain::non_empty;
use crate::types::{LogId, LogLevel};

/// A persisted log record. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    id: LogId,
    level: LogLevel,
    source: String,
    message: String,
    metadata: String,
    created_at: DateTime<Utc>,
}

impl Log {
    pub fn new(level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: LogId::generate(),
            level,
            source: source.into(),
            message: message.into(),
            metadata: String::new(),
            created_at: clock::now(),
        }
    }

    /// Attaches an opaque metadata payload (typically JSON).
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn from_parts(
        id: LogId,
        level: LogLevel,
        source: String,
        message: String,
        metadata: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            level,
            source,
            message,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> &LogId {
        &self.id
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> Option<&str> {
        non_empty(&self.metadata)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

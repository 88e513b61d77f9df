// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Threshold-filtered log persistence.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::domain::Log;
use crate::error::WorkflowError;
use crate::traits::LogRepository;
use crate::types::LogLevel;

/// Writes [`Log`] records for one source, dropping those below `threshold`.
#[derive(Clone)]
pub struct DbLogger {
    logs: Arc<dyn LogRepository>,
    source: String,
    threshold: LogLevel,
}

impl DbLogger {
    pub fn new(
        logs: Arc<dyn LogRepository>,
        source: impl Into<String>,
        threshold: LogLevel,
    ) -> Self {
        Self {
            logs,
            source: source.into(),
            threshold,
        }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Persists a record if `level` reaches the threshold.
    ///
    /// Returns the stored record, or `None` when it was filtered out.
    pub async fn log(
        &self,
        ctx: &Context,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Option<&str>,
    ) -> Result<Option<Log>, WorkflowError> {
        if !level.should_log(self.threshold) {
            return Ok(None);
        }
        let mut record = Log::new(level, self.source.clone(), message);
        if let Some(metadata) = metadata {
            record = record.with_metadata(metadata);
        }
        self.logs.create(ctx, &record).await?;
        debug!(log_id = %record.id(), level = %level, source = %self.source, "persisted log record");
        Ok(Some(record))
    }

    pub async fn debug(
        &self,
        ctx: &Context,
        message: impl Into<String>,
    ) -> Result<Option<Log>, WorkflowError> {
        self.log(ctx, LogLevel::Debug, message, None).await
    }

    pub async fn info(
        &self,
        ctx: &Context,
        message: impl Into<String>,
    ) -> Result<Option<Log>, WorkflowError> {
        self.log(ctx, LogLevel::Info, message, None).await
    }

    pub async fn warn(
        &self,
        ctx: &Context,
        message: impl Into<String>,
    ) -> Result<Option<Log>, WorkflowError> {
        self.log(ctx, LogLevel::Warn, message, None).await
    }

    pub async fn error(
        &self,
        ctx: &Context,
        message: impl Into<String>,
    ) -> Result<Option<Log>, WorkflowError> {
        self.log(ctx, LogLevel::Error, message, None).await
    }
}

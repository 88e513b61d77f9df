// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::types::{CronExpression, ScheduleId};

/// A cron-triggered binding of a skill name to an input payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    skill: String,
    cron: CronExpression,
    input: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl Schedule {
    /// A new schedule, enabled.
    pub fn new(skill: impl Into<String>, cron: CronExpression, input: impl Into<String>) -> Self {
        Self {
            id: ScheduleId::generate(),
            skill: skill.into(),
            cron,
            input: input.into(),
            enabled: true,
            created_at: clock::now(),
        }
    }

    pub fn from_parts(
        id: ScheduleId,
        skill: String,
        cron: CronExpression,
        input: String,
        enabled: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            skill,
            cron,
            input,
            enabled,
            created_at,
        }
    }

    pub fn id(&self) -> &ScheduleId {
        &self.id
    }

    /// Name of the scheduled skill.
    pub fn skill(&self) -> &str {
        &self.skill
    }

    pub fn cron(&self) -> &CronExpression {
        &self.cron
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn set_cron(&mut self, cron: CronExpression) {
        self.cron = cron;
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }
}

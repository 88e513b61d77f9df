// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock;
use crate::types::{SkillId, Version};

/// A named, versioned executable in the skill registry.
///
/// `name` is unique across the registry and is what schedules and tasks
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    id: SkillId,
    name: String,
    version: Version,
    location: String,
    permissions: Vec<String>,
    metadata: Map<String, Value>,
    created_at: DateTime<Utc>,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        location: impl Into<String>,
        permissions: Vec<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            id: SkillId::generate(),
            name: name.into(),
            version,
            location: location.into(),
            permissions,
            metadata,
            created_at: clock::now(),
        }
    }

    pub fn from_parts(
        id: SkillId,
        name: String,
        version: Version,
        location: String,
        permissions: Vec<String>,
        metadata: Map<String, Value>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            version,
            location,
            permissions,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> &SkillId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces every mutable field. Identity and name are fixed.
    pub fn update(
        &mut self,
        version: Version,
        location: impl Into<String>,
        permissions: Vec<String>,
        metadata: Map<String, Value>,
    ) {
        self.version = version;
        self.location = location.into();
        self.permissions = permissions;
        self.metadata = metadata;
    }
}

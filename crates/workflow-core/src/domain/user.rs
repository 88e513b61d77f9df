// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::types::{Channel, UserId};

/// A user identity on one channel. Immutable once created.
///
/// Session authorization is not decided here; see
/// [`SessionAccessService`](crate::services::SessionAccessService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    channel: Channel,
    channel_id: String,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(channel: Channel, channel_id: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            channel,
            channel_id: channel_id.into(),
            created_at: clock::now(),
        }
    }

    pub fn from_parts(
        id: UserId,
        channel: Channel,
        channel_id: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel,
            channel_id,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The user's identifier on the originating platform.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

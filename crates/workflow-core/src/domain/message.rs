// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::types::{MessageId, MessageRole, SessionId};

/// One immutable entry in a session's message stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(session_id: SessionId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            session_id,
            role,
            content: content.into(),
            created_at: clock::now(),
        }
    }

    pub fn from_parts(
        id: MessageId,
        session_id: SessionId,
        role: MessageRole,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            role,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn belongs_to_session(&self, session_id: &SessionId) -> bool {
        &self.session_id == session_id
    }

    pub fn is_from_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

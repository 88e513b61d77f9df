// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::types::{SessionId, UserId};

/// A user's conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        let now = clock::now();
        Self {
            id: SessionId::generate(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_parts(
        id: SessionId,
        user_id: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Marks activity on the session.
    pub fn touch(&mut self) {
        self.updated_at = clock::after(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn ownership_is_by_user_id() {
        let owner = UserId::must_new("u1");
        let session = Session::new(owner.clone());
        assert!(session.is_owned_by(&owner));
        assert!(!session.is_owned_by(&UserId::must_new("u2")));
    }

    #[test]
    fn touch_strictly_advances_updated_at() {
        let mut session = Session::new(UserId::must_new("u1"));
        assert_eq!(session.created_at(), session.updated_at());
        for _ in 0..100 {
            let before = session.updated_at();
            session.touch();
            assert!(session.updated_at() > before);
        }
        assert!(session.updated_at() >= session.created_at());
    }

    #[test]
    fn touch_advances_even_when_stored_time_is_ahead() {
        let future = clock::now() + TimeDelta::hours(1);
        let mut session = Session::from_parts(
            SessionId::must_new("s1"),
            UserId::must_new("u1"),
            future,
            future,
        );
        session.touch();
        assert!(session.updated_at() > future);
    }
}

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of platform identities to engine users.

use std::sync::Arc;

use tracing::{debug, info};

use crate::context::Context;
use crate::domain::User;
use crate::error::WorkflowError;
use crate::traits::UserRepository;
use crate::types::Channel;

/// Finds or registers the user behind a `(channel, channel_id)` identity.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn find(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        self.users.find_by_channel(ctx, channel, channel_id).await
    }

    /// Creates a user for an identity that must not exist yet.
    pub async fn register(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        let user = User::new(channel, channel_id);
        self.users.create(ctx, &user).await?;
        info!(user_id = %user.id(), channel = %channel, "registered user");
        Ok(user)
    }

    /// Returns the existing user or registers a new one.
    ///
    /// If a concurrent caller registers the same identity first, the
    /// uniqueness conflict is resolved by reading back the winner.
    pub async fn resolve(
        &self,
        ctx: &Context,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        match self.find(ctx, channel, channel_id).await {
            Ok(user) => return Ok(user),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        match self.register(ctx, channel, channel_id).await {
            Err(e) if e.is_conflict() => {
                debug!(channel = %channel, "user registered concurrently, reading back");
                self.find(ctx, channel, channel_id).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::UserId;

    /// In-memory user store. `race` simulates another writer winning the
    /// first insert.
    #[derive(Default)]
    struct FakeUsers {
        rows: Mutex<Vec<User>>,
        race: Mutex<Option<User>>,
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn create(&self, _ctx: &Context, user: &User) -> Result<(), WorkflowError> {
            if let Some(winner) = self.race.lock().unwrap().take() {
                self.rows.lock().unwrap().push(winner);
            }
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|u| u.channel() == user.channel() && u.channel_id() == user.channel_id())
            {
                return Err(WorkflowError::conflict("user", "duplicate channel identity"));
            }
            rows.push(user.clone());
            Ok(())
        }

        async fn find_by_id(&self, _ctx: &Context, id: &UserId) -> Result<User, WorkflowError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id() == id)
                .cloned()
                .ok_or_else(|| WorkflowError::not_found("user", id.as_str()))
        }

        async fn find_by_channel(
            &self,
            _ctx: &Context,
            channel: Channel,
            channel_id: &str,
        ) -> Result<User, WorkflowError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.channel() == channel && u.channel_id() == channel_id)
                .cloned()
                .ok_or_else(|| WorkflowError::not_found("user", channel_id))
        }

        async fn list(&self, _ctx: &Context) -> Result<Vec<User>, WorkflowError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn delete(&self, _ctx: &Context, id: &UserId) -> Result<(), WorkflowError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|u| u.id() != id);
            if rows.len() == before {
                return Err(WorkflowError::not_found("user", id.as_str()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolve_creates_once_then_reuses() {
        let ctx = Context::background();
        let dir = UserDirectory::new(Arc::new(FakeUsers::default()));

        let first = dir.resolve(&ctx, Channel::Telegram, "u1").await.unwrap();
        let second = dir.resolve(&ctx, Channel::Telegram, "u1").await.unwrap();
        assert_eq!(first.id(), second.id());

        let other = dir.resolve(&ctx, Channel::Discord, "u1").await.unwrap();
        assert_ne!(other.id(), first.id());
    }

    #[tokio::test]
    async fn register_duplicate_is_conflict() {
        let ctx = Context::background();
        let dir = UserDirectory::new(Arc::new(FakeUsers::default()));
        dir.register(&ctx, Channel::Web, "w1").await.unwrap();
        let err = dir.register(&ctx, Channel::Web, "w1").await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn resolve_reads_back_after_losing_a_race() {
        let ctx = Context::background();
        let winner = User::new(Channel::Telegram, "u1");
        let repo = FakeUsers {
            race: Mutex::new(Some(winner.clone())),
            ..Default::default()
        };
        let dir = UserDirectory::new(Arc::new(repo));

        let resolved = dir.resolve(&ctx, Channel::Telegram, "u1").await.unwrap();
        assert_eq!(resolved.id(), winner.id());
    }
}

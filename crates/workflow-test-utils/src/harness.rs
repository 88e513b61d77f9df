// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for storage-backed integration tests.
//!
//! `TestStore` owns a temp directory holding a SQLite database, opened through
//! the same [`Store::open`] path production code uses and migrated to the
//! latest bundled schema.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use workflow_config::DatabaseConfig;
use workflow_core::{Channel, Context, Session, User, WorkflowError};
use workflow_storage::{Store, bundled_migrations_dir};

/// Builder for creating test stores with configurable options.
pub struct TestStoreBuilder {
    migrate: bool,
    migrations_path: PathBuf,
}

impl TestStoreBuilder {
    fn new() -> Self {
        Self {
            migrate: true,
            migrations_path: bundled_migrations_dir(),
        }
    }

    /// Leave the database empty instead of applying migrations.
    pub fn unmigrated(mut self) -> Self {
        self.migrate = false;
        self
    }

    /// Use migration scripts from another directory.
    pub fn with_migrations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.migrations_path = path.into();
        self
    }

    pub async fn build(self) -> Result<TestStore, WorkflowError> {
        let temp_dir = TempDir::new()
            .map_err(|e| WorkflowError::storage("failed to create temp dir", e))?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = DatabaseConfig::sqlite(db_path.to_string_lossy());
        config.migrations_path = self.migrations_path.to_string_lossy().into_owned();
        let store = Store::open(&config).await?;

        let ctx = Context::background();
        if self.migrate {
            store.migrate_up(&ctx).await?;
        }

        Ok(TestStore {
            store,
            ctx,
            db_path,
            _temp_dir: temp_dir,
        })
    }
}

/// A throwaway store. The database file is removed when this is dropped.
pub struct TestStore {
    store: Store,
    ctx: Context,
    db_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestStore {
    pub fn builder() -> TestStoreBuilder {
        TestStoreBuilder::new()
    }

    /// A migrated store with default settings.
    pub async fn new() -> Result<Self, WorkflowError> {
        Self::builder().build().await
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// A background context shared by helper calls.
    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Persists a fresh user for `(channel, channel_id)`.
    pub async fn seed_user(
        &self,
        channel: Channel,
        channel_id: &str,
    ) -> Result<User, WorkflowError> {
        let user = User::new(channel, channel_id);
        self.store.users().create(&self.ctx, &user).await?;
        Ok(user)
    }

    /// Persists a fresh session owned by `user`.
    pub async fn seed_session(&self, user: &User) -> Result<Session, WorkflowError> {
        let session = Session::new(user.id().clone());
        self.store.sessions().create(&self.ctx, &session).await?;
        Ok(session)
    }
}

impl Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

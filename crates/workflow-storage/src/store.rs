// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend-agnostic entry point.
//!
//! [`Store::open`] reads a [`DatabaseConfig`], opens the matching backend and
//! hands out the seven repositories as trait objects. Callers never name a
//! backend type after this point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use workflow_config::{BackendKind, DatabaseConfig};
use workflow_core::{
    Context, DbLogger, LogLevel, LogRepository, MessageRepository, ScheduleRepository,
    SessionAccessService, SessionRepository, SkillRepository, TaskRepository, UserDirectory,
    UserRepository, WorkflowError,
};

use crate::migrations::{MigrationReport, MigrationRunner, MigrationStatus, MigrationTarget};
use crate::postgres::{
    PgDatabase, PgLogRepository, PgMessageRepository, PgScheduleRepository, PgSessionRepository,
    PgSkillRepository, PgTaskRepository, PgUserRepository,
};
use crate::sqlite::{
    SqliteDatabase, SqliteLogRepository, SqliteMessageRepository, SqliteScheduleRepository,
    SqliteSessionRepository, SqliteSkillRepository, SqliteTaskRepository, SqliteUserRepository,
};

/// Directory of the migration scripts shipped with this crate.
pub fn bundled_migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

enum Backend {
    Sqlite(Arc<SqliteDatabase>),
    Postgres(Arc<PgDatabase>),
}

/// An open database with its repositories.
pub struct Store {
    backend: Backend,
    migrations_path: PathBuf,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageRepository>,
    tasks: Arc<dyn TaskRepository>,
    skills: Arc<dyn SkillRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    logs: Arc<dyn LogRepository>,
}

impl Store {
    /// Opens the backend named by `config.type`.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, WorkflowError> {
        let migrations_path = PathBuf::from(&config.migrations_path);
        match config.backend()? {
            BackendKind::Sqlite => {
                let db = SqliteDatabase::open(config.path()?).await?;
                Ok(Self::from_sqlite(Arc::new(db), migrations_path))
            }
            BackendKind::Postgres => {
                let db = PgDatabase::connect(config).await?;
                Ok(Self::from_postgres(Arc::new(db), migrations_path))
            }
        }
    }

    pub fn from_sqlite(db: Arc<SqliteDatabase>, migrations_path: PathBuf) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(db.clone())),
            sessions: Arc::new(SqliteSessionRepository::new(db.clone())),
            messages: Arc::new(SqliteMessageRepository::new(db.clone())),
            tasks: Arc::new(SqliteTaskRepository::new(db.clone())),
            skills: Arc::new(SqliteSkillRepository::new(db.clone())),
            schedules: Arc::new(SqliteScheduleRepository::new(db.clone())),
            logs: Arc::new(SqliteLogRepository::new(db.clone())),
            backend: Backend::Sqlite(db),
            migrations_path,
        }
    }

    pub fn from_postgres(db: Arc<PgDatabase>, migrations_path: PathBuf) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            sessions: Arc::new(PgSessionRepository::new(db.clone())),
            messages: Arc::new(PgMessageRepository::new(db.clone())),
            tasks: Arc::new(PgTaskRepository::new(db.clone())),
            skills: Arc::new(PgSkillRepository::new(db.clone())),
            schedules: Arc::new(PgScheduleRepository::new(db.clone())),
            logs: Arc::new(PgLogRepository::new(db.clone())),
            backend: Backend::Postgres(db),
            migrations_path,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self.backend {
            Backend::Sqlite(_) => BackendKind::Sqlite,
            Backend::Postgres(_) => BackendKind::Postgres,
        }
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    pub fn messages(&self) -> Arc<dyn MessageRepository> {
        self.messages.clone()
    }

    pub fn tasks(&self) -> Arc<dyn TaskRepository> {
        self.tasks.clone()
    }

    pub fn skills(&self) -> Arc<dyn SkillRepository> {
        self.skills.clone()
    }

    pub fn schedules(&self) -> Arc<dyn ScheduleRepository> {
        self.schedules.clone()
    }

    pub fn logs(&self) -> Arc<dyn LogRepository> {
        self.logs.clone()
    }

    pub fn access_service(&self) -> SessionAccessService {
        SessionAccessService::new(self.sessions())
    }

    pub fn user_directory(&self) -> UserDirectory {
        UserDirectory::new(self.users())
    }

    pub fn logger(&self, source: impl Into<String>, threshold: LogLevel) -> DbLogger {
        DbLogger::new(self.logs(), source, threshold)
    }

    /// Loads the scripts for this backend from the configured directory.
    pub fn migration_runner(&self) -> Result<MigrationRunner, WorkflowError> {
        MigrationRunner::new(&self.migrations_path, self.kind())
    }

    fn migration_target(&self) -> &dyn MigrationTarget {
        match &self.backend {
            Backend::Sqlite(db) => db.as_ref(),
            Backend::Postgres(db) => db.as_ref(),
        }
    }

    pub async fn migrate_up(&self, ctx: &Context) -> Result<MigrationReport, WorkflowError> {
        self.migration_runner()?
            .migrate_up(ctx, self.migration_target())
            .await
    }

    pub async fn rollback_one(&self, ctx: &Context) -> Result<MigrationReport, WorkflowError> {
        self.migration_runner()?
            .rollback_one(ctx, self.migration_target())
            .await
    }

    pub async fn migration_status(
        &self,
        ctx: &Context,
    ) -> Result<Vec<MigrationStatus>, WorkflowError> {
        self.migration_runner()?
            .status(ctx, self.migration_target())
            .await
    }

    /// Round-trips a query. On Postgres this also trims surplus idle connections.
    pub async fn health_check(&self, ctx: &Context) -> Result<(), WorkflowError> {
        let result = match &self.backend {
            Backend::Sqlite(db) => ctx.run(db.ping()).await,
            Backend::Postgres(db) => {
                let result = ctx.run(db.ping()).await;
                db.trim_idle();
                result
            }
        };
        if let Err(e) = &result {
            warn!(backend = %self.kind(), error = %e, "health check failed");
        }
        result
    }

    pub async fn close(&self) -> Result<(), WorkflowError> {
        match &self.backend {
            Backend::Sqlite(db) => db.close().await?,
            Backend::Postgres(db) => db.close(),
        }
        info!(backend = %self.kind(), "store closed");
        Ok(())
    }
}

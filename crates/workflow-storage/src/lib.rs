// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence backends for the workflow engine.
//!
//! Provides SQLite (embedded, single connection through `tokio-rusqlite`) and
//! PostgreSQL (pooled through `deadpool-postgres`) implementations of the
//! repository contracts in `workflow-core`, the record/entity mappers they
//! share, and a versioned migration runner with per-dialect SQL scripts.

pub mod mappers;
pub mod migrations;
pub mod postgres;
pub mod records;
pub mod sqlite;
pub mod store;

pub use migrations::{
    AppliedMigration, Migration, MigrationReport, MigrationRunner, MigrationStatus,
    MigrationTarget,
};
pub use postgres::PgDatabase;
pub use sqlite::SqliteDatabase;
pub use store::{Store, bundled_migrations_dir};

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for workflow engine integration tests.
//!
//! Provides a migrated throwaway database and a mock channel connector for
//! fast, deterministic tests without external services.
//!
//! # Components
//!
//! - [`TestStore`] - Temp-dir SQLite [`Store`](workflow_storage::Store), migrated on build
//! - [`MockConnector`] - In-memory channel connector with message injection and capture

pub mod harness;
pub mod mock_connector;

pub use harness::{TestStore, TestStoreBuilder};
pub use mock_connector::MockConnector;

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain services composed over the repository traits.

pub mod access;
pub mod logger;
pub mod users;

pub use access::SessionAccessService;
pub use logger::DbLogger;
pub use users::UserDirectory;

// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `/etc/workflow/workflow.toml`, then
//! `~/.config/workflow/workflow.toml`, then `./workflow.toml`, then
//! `WORKFLOW_*` environment variables. Later layers win.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Data, Env, Format, Serialized, Toml},
};
use tracing::{debug, trace};

use crate::model::WorkflowConfig;

/// Sections that environment variables may target.
const ENV_SECTIONS: &[&str] = &["database", "logging"];

pub const SYSTEM_CONFIG_PATH: &str = "/etc/workflow/workflow.toml";
pub const LOCAL_CONFIG_PATH: &str = "workflow.toml";

/// `~/.config/workflow/workflow.toml`, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("workflow").join("workflow.toml"))
}

/// The standard lookup chain, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(file_layer(Path::new(SYSTEM_CONFIG_PATH)))
        .merge(file_layer(&user_config_path().unwrap_or_default()))
        .merge(file_layer(Path::new(LOCAL_CONFIG_PATH)))
        .merge(env_provider())
}

/// Loads configuration from the standard lookup chain.
pub fn load_config() -> Result<WorkflowConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from one file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<WorkflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(file_layer(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string only. No environment overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<WorkflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WorkflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// A TOML file layer. Missing files contribute nothing.
fn file_layer(path: &Path) -> Data<Toml> {
    if path.is_file() {
        debug!(path = %path.display(), "merging config file");
    } else {
        trace!(path = %path.display(), "config file not present");
    }
    Toml::file(path)
}

/// `WORKFLOW_<SECTION>_<KEY>` → `<section>.<key>`.
///
/// The section prefix is matched explicitly because keys themselves contain
/// underscores (`WORKFLOW_DATABASE_MAX_OPEN_CONNS` → `database.max_open_conns`).
/// Variables outside the known sections are ignored.
fn env_provider() -> Env {
    Env::prefixed("WORKFLOW_").filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        let mapped = ENV_SECTIONS.iter().find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        });
        match &mapped {
            Some(path) => debug!(key = %path, "config override from environment"),
            None => trace!(var = %key, "ignoring unrelated WORKFLOW_ variable"),
        }
        mapped.map(Into::into)
    })
}

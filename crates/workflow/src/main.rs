// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow engine database tooling.
//!
//! Applies, reverts, and reports schema migrations for the configured
//! backend, and checks that the database is reachable.

mod migrate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use workflow_config::WorkflowConfig;

/// Workflow engine database tooling.
#[derive(Parser, Debug)]
#[command(name = "workflow", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage schema migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Check that the database answers a round-trip query.
    Check,
}

#[derive(Subcommand, Debug)]
enum MigrateAction {
    /// Apply every pending migration in version order.
    Up,
    /// Revert the most recently applied migration.
    Down,
    /// List known migrations and when each was applied.
    Status {
        /// Output as JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Option<WorkflowConfig> {
    let loaded = match path {
        Some(path) => workflow_config::load_and_validate_path(path),
        None => workflow_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            workflow_config::render_errors(&errors);
            None
        }
    }
}

/// Initialize tracing with an EnvFilter. `RUST_LOG` wins over the config level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("workflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Up => migrate::run_up(&config.database).await,
            MigrateAction::Down => migrate::run_down(&config.database).await,
            MigrateAction::Status { json, plain } => {
                migrate::run_status(&config.database, json, plain).await
            }
        },
        Commands::Check => migrate::run_check(&config.database).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

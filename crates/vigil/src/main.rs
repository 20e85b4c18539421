// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vigil - compliance alert generation for multi-tenant workforce records.
//!
//! This is the binary entry point: one-shot batches, the scheduled service
//! and an environment check.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod run;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use vigil_config::model::VigilConfig;
use vigil_core::{StorageAdapter, VigilError};
use vigil_storage::SqliteStorage;

/// Vigil - compliance alert generation engine.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate alerts once for every enabled tenant, or a single one.
    Run {
        /// Only process this organization.
        #[arg(long)]
        org: Option<String>,
        /// Print the digest as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run alert batches on the configured cron schedule.
    Serve,
    /// Validate configuration and storage.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vigil_config::load_and_validate_path(path),
        None => vigil_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vigil_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Run { org, json }) => run::run_batch(&config, org, json).await,
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check { plain }) => check::run_check(&config, plain).await,
        None => {
            println!("vigil: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Open (and migrate) the configured database.
pub(crate) async fn open_storage(config: &VigilConfig) -> Result<Arc<SqliteStorage>, VigilError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `vigil run --json` keeps stdout machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigil={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

//! # sync-gate
//!
//! CLI tool for replaying sync schedules against the sync-gate admission
//! controller.
//!
//! ## Commands
//!
//! - `simulate`: Replay a schedule of requests for one user
//! - `policy`: Show the effective rate-limit table
//!
//! ## Example
//!
//! ```bash
//! # Two app-open syncs per 3 minutes: the third is rate limited
//! sync-gate simulate --request-type user-app-open --at 0,1,2,4
//!
//! # Same schedule with custom limits and no simulated failures
//! sync-gate --config gate.toml simulate -t user-app-open --at 0,1,2,4 --failure-rate 0
//!
//! # Show the policy in force
//! sync-gate policy
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sync_gate_coordinator::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{policy, simulate};

/// Default configuration file, used when present in the working directory.
const DEFAULT_CONFIG_FILE: &str = "gate.toml";

/// CLI tool for replaying sync schedules against sync-gate.
#[derive(Parser, Debug)]
#[command(name = "sync-gate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./gate.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a schedule of sync requests for one user
    Simulate(simulate::SimulateArgs),

    /// Show the effective rate-limit policy
    Policy,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => {
            simulate::run(&config, &args).await?;
        }
        Commands::Policy => {
            policy::run(&config.policies());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the given config file, or `gate.toml` if present, or defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                Config::from_file(default).context("Failed to load gate.toml")
            } else {
                Ok(Config::default())
            }
        }
    }
}

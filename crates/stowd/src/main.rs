//! stowd — the stowgrid daemon.
//!
//! Serves calculation requests against the local state store and runs
//! one-off plans, comparisons and benchmarks on JSON snapshots.
//!
//! # Usage
//!
//! ```text
//! stowd --config stow.toml serve
//! stowd plan --snapshot snapshot.json --packer first_fit
//! stowd bench --warehouses 50 --items 5000 --seed 7
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stow_core::{LogFormat, PackerKind, StowConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "stowd",
    about = "stowgrid distribution daemon",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to stow.toml (defaults and STOW_* variables apply without it).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consume JSON calculation requests, one per line on stdin.
    Serve {
        /// Override the packing strategy (wfd, first_fit).
        #[arg(long)]
        packer: Option<PackerKind>,
    },
    /// Compute a plan for a snapshot file and print it as JSON.
    Plan {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(long)]
        packer: Option<PackerKind>,
        #[arg(long, default_value = "cli")]
        request_id: String,
    },
    /// Run every strategy on a snapshot and compare load spread.
    Compare {
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Compare strategies on a synthetic network.
    Bench {
        #[arg(long, default_value = "50")]
        warehouses: usize,
        #[arg(long, default_value = "1000")]
        items: usize,
        /// Seed for reproducible runs; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Load seed data (warehouses, products, stock, shipments, supplies).
    Import {
        #[arg(short, long)]
        snapshot: PathBuf,
    },
    /// Print a starter stow.toml.
    InitConfig,
}

const DEFAULT_FILTER: &str = "info,stowd=debug,stow_core=debug,stowgrid_placement=debug,stowgrid_state=debug,stowgrid_dispatch=debug";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // Logs go to stderr; stdout carries plans and reports.
    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = StowConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(config.log_format);

    match cli.command {
        Command::Serve { packer } => {
            if let Some(packer) = packer {
                config.packer = packer;
            }
            commands::serve::run(&config).await
        }
        Command::Plan {
            snapshot,
            packer,
            request_id,
        } => commands::plan::plan(&snapshot, packer.unwrap_or(config.packer), &request_id),
        Command::Compare { snapshot, format } => commands::plan::compare(&snapshot, &format),
        Command::Bench {
            warehouses,
            items,
            seed,
            format,
        } => commands::bench::bench(warehouses, items, seed, &format),
        Command::Import { snapshot } => commands::import::import(&config, &snapshot),
        Command::InitConfig => commands::config::init(&config),
    }
}

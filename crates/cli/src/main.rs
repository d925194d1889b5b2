//! Installments CLI - Preview fixed-rate installment borrows.

mod cli;
mod commands;
mod output;
mod snapshot;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{run_plan, run_rate, run_utilization};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Plan(args) => {
            run_plan(&args, cli.format)?;
        }
        Commands::Rate(args) => {
            run_rate(&args, cli.format)?;
        }
        Commands::Utilization(args) => {
            run_utilization(&args, cli.format)?;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warn).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

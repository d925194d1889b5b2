//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use installments_sim::DEFAULT_MAX_ITERATIONS;

/// Installments CLI - Preview fixed-rate installment borrows
#[derive(Parser, Debug)]
#[command(name = "installments")]
#[command(about = "CLI tool for previewing fixed-rate installment borrows", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a borrow into installments across maturity pools
    Plan(PlanArgs),
    /// Evaluate the fixed-rate curve at a utilization or over an interval
    Rate(RateArgs),
    /// Show pool and floating pool utilizations of a snapshot
    Utilization(UtilizationArgs),
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Snapshot JSON file (can also use INSTALLMENTS_SNAPSHOT env var)
    #[arg(long, env = "INSTALLMENTS_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Amount to borrow in human-readable units (e.g., "1000.5")
    #[arg(long)]
    pub amount: String,

    /// Number of installments
    #[arg(long)]
    pub count: u32,

    /// Maturity of the first installment (unix seconds)
    #[arg(long)]
    pub first_maturity: u64,

    /// Seconds between consecutive maturities
    #[arg(long)]
    pub interval: u64,

    /// Largest acceptable rate gap between installments (e.g., "0.001")
    #[arg(long, default_value = "0.001")]
    pub tolerance: String,

    /// Current time in unix seconds (can also use INSTALLMENTS_NOW env var, default: system clock)
    #[arg(long, env = "INSTALLMENTS_NOW")]
    pub now: Option<u64>,

    /// Maximum rebalancing rounds
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,
}

#[derive(Parser, Debug)]
pub struct RateArgs {
    /// Curve steepness (e.g., "0.01")
    #[arg(long)]
    pub a: String,

    /// Curve offset, may be negative (e.g., "-0.02")
    #[arg(long, allow_hyphen_values = true)]
    pub b: String,

    /// Utilization ceiling (e.g., "0.9")
    #[arg(long)]
    pub u_max: String,

    /// Utilization to price (e.g., "0.4")
    #[arg(long)]
    pub utilization: String,

    /// Post-borrow utilization; prices the interval average instead of a point
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug)]
pub struct UtilizationArgs {
    /// Snapshot JSON file (can also use INSTALLMENTS_SNAPSHOT env var)
    #[arg(long, env = "INSTALLMENTS_SNAPSHOT")]
    pub snapshot: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

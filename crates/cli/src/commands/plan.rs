//! Plan command implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use installments_sim::{
    solve_installments_with, InstallmentPlan, InstallmentRequest, SlopeProportional, SolverConfig,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::{OutputFormat, PlanArgs};
use crate::output::{format_plan_summary, format_plan_table, wad_string};
use crate::snapshot::{load_snapshot, parse_wad};

#[derive(Serialize)]
struct InstallmentOutput {
    maturity: u64,
    principal: String,
    rate: String,
    fee: String,
    repay: String,
    utilization: String,
}

#[derive(Serialize)]
struct PlanOutput {
    now: u64,
    total_principal: String,
    total_fees: String,
    total_repay: String,
    effective_rate: String,
    global_utilization: String,
    rate_spread: String,
    iterations: u32,
    converged: bool,
    installments: Vec<InstallmentOutput>,
}

impl PlanOutput {
    fn new(plan: &InstallmentPlan, now: u64) -> Self {
        let installments = (0..plan.len())
            .map(|i| InstallmentOutput {
                maturity: plan.maturities[i],
                principal: wad_string(plan.principals[i]),
                rate: wad_string(plan.rates[i]),
                fee: wad_string(plan.fees[i]),
                repay: wad_string(plan.repay_amounts[i]),
                utilization: wad_string(plan.utilizations[i]),
            })
            .collect();

        Self {
            now,
            total_principal: wad_string(plan.total_principal()),
            total_fees: wad_string(plan.total_fees()),
            total_repay: wad_string(plan.total_repay()),
            effective_rate: wad_string(plan.effective_rate),
            global_utilization: wad_string(plan.global_utilization),
            rate_spread: wad_string(plan.rate_spread),
            iterations: plan.iterations,
            converged: plan.converged,
            installments,
        }
    }
}

fn current_timestamp() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the unix epoch")?;
    Ok(elapsed.as_secs())
}

pub fn run_plan(args: &PlanArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let amount = parse_wad(&args.amount).context("Invalid --amount")?;
    let tolerance = parse_wad(&args.tolerance).context("Invalid --tolerance")?;
    let now = match args.now {
        Some(now) => now,
        None => current_timestamp()?,
    };

    let request = InstallmentRequest::new(amount, args.count, args.first_maturity, args.interval)
        .with_rate_tolerance(tolerance);
    let config = SolverConfig::new().with_max_iterations(args.max_iterations);
    debug!(
        pools = snapshot.pools.len(),
        count = args.count,
        now,
        "solving installment plan"
    );

    let plan = solve_installments_with(
        &request,
        &snapshot.pools,
        &snapshot.market,
        &snapshot.curve,
        now,
        &config,
        &SlopeProportional,
    )
    .context("Failed to solve installment plan")?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_plan_table(&plan, now));
            println!();
            print!("{}", format_plan_summary(&plan, &request));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&PlanOutput::new(&plan, now))?);
        }
    }

    Ok(())
}

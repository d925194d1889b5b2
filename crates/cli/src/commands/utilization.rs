//! Utilization command implementation.

use anyhow::Result;
use installments_sim::evaluate_curve;
use serde::Serialize;

use crate::cli::{OutputFormat, UtilizationArgs};
use crate::output::{format_market_detail, format_pools_table, wad_string};
use crate::snapshot::{load_snapshot, Snapshot};

#[derive(Serialize)]
struct PoolOutput {
    maturity: u64,
    supplied: String,
    borrowed: String,
    backup_borrowed: String,
    /// Null when floating deposits are zero
    utilization: Option<String>,
    rate: Option<String>,
    capacity: Option<String>,
}

#[derive(Serialize)]
struct UtilizationOutput {
    /// Null when floating deposits are zero
    floating_utilization: Option<String>,
    global_utilization: Option<String>,
    free_liquidity: String,
    pools: Vec<PoolOutput>,
}

impl UtilizationOutput {
    fn new(snapshot: &Snapshot) -> Self {
        let deposits = snapshot.market.total_floating_deposits;
        let pools = snapshot
            .pools
            .iter()
            .map(|pool| {
                let utilization = pool.utilization(deposits).ok();
                PoolOutput {
                    maturity: pool.maturity,
                    supplied: wad_string(pool.supplied),
                    borrowed: wad_string(pool.borrowed),
                    backup_borrowed: wad_string(pool.backup_borrowed()),
                    utilization: utilization.map(wad_string),
                    rate: utilization
                        .and_then(|u| evaluate_curve(&snapshot.curve, u).ok())
                        .map(wad_string),
                    capacity: pool.capacity(&snapshot.curve, deposits).ok().map(wad_string),
                }
            })
            .collect();

        Self {
            floating_utilization: snapshot.market.floating_utilization.map(wad_string),
            global_utilization: snapshot.market.global_utilization().ok().map(wad_string),
            free_liquidity: wad_string(snapshot.market.free_liquidity()),
            pools,
        }
    }
}

pub fn run_utilization(args: &UtilizationArgs, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;

    match format {
        OutputFormat::Table => {
            let global = snapshot.market.global_utilization().ok();
            print!(
                "{}",
                format_market_detail(&snapshot.market, &snapshot.curve, global)
            );
            println!(
                "{}",
                format_pools_table(
                    &snapshot.pools,
                    &snapshot.curve,
                    snapshot.market.total_floating_deposits
                )
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&UtilizationOutput::new(&snapshot))?
            );
        }
    }

    Ok(())
}

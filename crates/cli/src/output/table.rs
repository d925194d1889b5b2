//! Table formatting for plans and pool snapshots.

use alloy_primitives::U256;
use installments_sim::{evaluate_curve, CurveParameters, InstallmentPlan, PoolState};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use super::{format_amount, format_days, format_percent};

#[derive(Tabled)]
struct InstallmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Maturity")]
    maturity: u64,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Principal")]
    principal: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Fee")]
    fee: String,
    #[tabled(rename = "Repay")]
    repay: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
}

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Maturity")]
    maturity: u64,
    #[tabled(rename = "Supplied")]
    supplied: String,
    #[tabled(rename = "Borrowed")]
    borrowed: String,
    #[tabled(rename = "Backup")]
    backup: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
}

pub fn format_plan_table(plan: &InstallmentPlan, now: u64) -> String {
    if plan.is_empty() {
        return "No installments.".to_string();
    }

    let rows: Vec<InstallmentRow> = (0..plan.len())
        .map(|i| InstallmentRow {
            index: i + 1,
            maturity: plan.maturities[i],
            days: format_days(plan.maturities[i], now),
            principal: format_amount(plan.principals[i]),
            rate: format_percent(plan.rates[i]),
            fee: format_amount(plan.fees[i]),
            repay: format_amount(plan.repay_amounts[i]),
            utilization: format_percent(plan.utilizations[i]),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}

pub fn format_pools_table(pools: &[PoolState], curve: &CurveParameters, deposits: U256) -> String {
    if pools.is_empty() {
        return "No pools found.".to_string();
    }

    let rows: Vec<PoolRow> = pools
        .iter()
        .map(|pool| {
            let utilization = pool.utilization(deposits).ok();
            let rate = utilization
                .and_then(|u| evaluate_curve(curve, u).ok())
                .map_or_else(|| "-".to_string(), format_percent);
            PoolRow {
                maturity: pool.maturity,
                supplied: format_amount(pool.supplied),
                borrowed: format_amount(pool.borrowed),
                backup: format_amount(pool.backup_borrowed()),
                utilization: utilization.map_or_else(|| "-".to_string(), format_percent),
                rate,
                capacity: pool
                    .capacity(curve, deposits)
                    .map_or_else(|_| "-".to_string(), format_amount),
            }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}

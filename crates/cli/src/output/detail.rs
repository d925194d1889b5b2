//! Detailed output formatting for plan summaries, rates and market state.

use alloy_primitives::U256;
use colored::Colorize;
use installments_sim::{CurveParameters, GlobalMarketState, InstallmentPlan, InstallmentRequest};

use super::{format_amount, format_percent, format_signed_percent};

fn header(output: &mut String, title: &str) {
    output.push_str(&format!("{}\n", "=".repeat(60)));
    output.push_str(&format!("{}\n", title.bold()));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));
}

fn format_curve(output: &mut String, curve: &CurveParameters) {
    output.push_str(&format!("{}\n", "Curve".cyan().bold()));
    output.push_str(&format!("  a:       {}\n", format_percent(curve.a)));
    output.push_str(&format!("  b:       {}\n", format_signed_percent(curve.b)));
    output.push_str(&format!("  u_max:   {}\n\n", format_percent(curve.u_max)));
}

pub fn format_plan_summary(plan: &InstallmentPlan, request: &InstallmentRequest) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Summary".cyan().bold()));
    output.push_str(&format!("  Borrowed:        {}\n", format_amount(plan.total_principal())));
    output.push_str(&format!("  Total Fees:      {}\n", format_amount(plan.total_fees())));
    output.push_str(&format!("  Total Repay:     {}\n", format_amount(plan.total_repay())));
    output.push_str(&format!("  Effective Rate:  {}\n", format_percent(plan.effective_rate)));
    output.push_str(&format!(
        "  Global Util:     {}\n\n",
        format_percent(plan.global_utilization)
    ));

    output.push_str(&format!("{}\n", "Solver".cyan().bold()));
    output.push_str(&format!("  Installments:    {}\n", plan.len()));
    output.push_str(&format!("  Iterations:      {}\n", plan.iterations));
    output.push_str(&format!("  Rate Spread:     {}\n", format_percent(plan.rate_spread)));
    output.push_str(&format!(
        "  Tolerance:       {}\n",
        format_percent(request.rate_tolerance)
    ));
    let status = if plan.converged {
        "Converged".green()
    } else {
        "Not converged (best effort)".yellow()
    };
    output.push_str(&format!("  Status:          {}\n", status));

    if plan.len() < request.installment_count as usize {
        output.push_str(&format!(
            "  Note:            {} installments folded into the last maturity\n",
            request.installment_count as usize - plan.len() + 1
        ));
    }

    output
}

pub fn format_rate_detail(
    curve: &CurveParameters,
    utilization: U256,
    to: Option<U256>,
    rate: U256,
    slope: U256,
) -> String {
    let mut output = String::new();

    header(&mut output, "Fixed Rate Curve");
    format_curve(&mut output, curve);

    output.push_str(&format!("{}\n", "Pricing".cyan().bold()));
    match to {
        Some(to) => {
            output.push_str(&format!(
                "  Interval:  {} -> {}\n",
                format_percent(utilization),
                format_percent(to)
            ));
            output.push_str(&format!("  Average:   {}\n", format_percent(rate)));
        }
        None => {
            output.push_str(&format!("  Utilization: {}\n", format_percent(utilization)));
            output.push_str(&format!("  Rate:        {}\n", format_percent(rate)));
        }
    }
    output.push_str(&format!("  Slope:     {}\n", format_amount(slope)));

    output
}

pub fn format_market_detail(
    market: &GlobalMarketState,
    curve: &CurveParameters,
    global_utilization: Option<U256>,
) -> String {
    let mut output = String::new();

    header(&mut output, "Market Snapshot");
    format_curve(&mut output, curve);

    output.push_str(&format!("{}\n", "Floating Pool".cyan().bold()));
    output.push_str(&format!(
        "  Deposits:        {}\n",
        format_amount(market.total_floating_deposits)
    ));
    output.push_str(&format!(
        "  Borrows:         {}\n",
        format_amount(market.total_floating_borrows)
    ));
    output.push_str(&format!(
        "  Backup Borrowed: {}\n",
        format_amount(market.floating_backup_borrowed)
    ));
    output.push_str(&format!("  Free Liquidity:  {}\n", format_amount(market.free_liquidity())));
    output.push_str(&format!(
        "  Floating Util:   {}\n",
        market
            .floating_utilization
            .map_or_else(|| "undefined".to_string(), format_percent)
    ));
    output.push_str(&format!(
        "  Global Util:     {}\n\n",
        global_utilization.map_or_else(|| "undefined".to_string(), format_percent)
    ));

    output
}

//! Output formatting for CLI results.

pub mod detail;
pub mod table;

pub use detail::{format_market_detail, format_plan_summary, format_rate_detail};
pub use table::{format_plan_table, format_pools_table};

use alloy_primitives::{I256, U256};
use rust_decimal::Decimal;

const WAD_SCALE: u32 = 18;

/// Exact decimal value of a WAD figure, `None` past `Decimal`'s 96-bit range.
pub fn wad_to_decimal(value: U256) -> Option<Decimal> {
    let raw = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(raw, WAD_SCALE)
        .ok()
        .map(|d| d.normalize())
}

pub fn signed_wad_to_decimal(value: I256) -> Option<Decimal> {
    let magnitude = wad_to_decimal(value.unsigned_abs())?;
    Some(if value.is_negative() { -magnitude } else { magnitude })
}

/// Full-precision decimal string, for JSON output.
pub fn wad_string(value: U256) -> String {
    match wad_to_decimal(value) {
        Some(d) => d.to_string(),
        None => {
            let wad = U256::from(10u64).pow(U256::from(WAD_SCALE));
            let fraction = format!("{:0>18}", (value % wad).to_string());
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                (value / wad).to_string()
            } else {
                format!("{}.{}", value / wad, fraction)
            }
        }
    }
}

pub fn signed_wad_string(value: I256) -> String {
    let magnitude = wad_string(value.unsigned_abs());
    if value.is_negative() {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Amount rounded for display.
pub fn format_amount(value: U256) -> String {
    if value == U256::MAX {
        return "unlimited".to_string();
    }
    match wad_to_decimal(value) {
        Some(d) => format!("{:.4}", d.round_dp(4)),
        None => wad_string(value),
    }
}

/// WAD ratio as a percentage.
pub fn format_percent(value: U256) -> String {
    match wad_to_decimal(value) {
        Some(d) => format!("{:.3}%", (d * Decimal::ONE_HUNDRED).round_dp(3)),
        None => "-".to_string(),
    }
}

pub fn format_signed_percent(value: I256) -> String {
    match signed_wad_to_decimal(value) {
        Some(d) => format!("{:.3}%", (d * Decimal::ONE_HUNDRED).round_dp(3)),
        None => "-".to_string(),
    }
}

/// Days from `now` until `maturity`.
pub fn format_days(maturity: u64, now: u64) -> String {
    let seconds = Decimal::from(maturity.saturating_sub(now));
    format!("{:.1}", (seconds / Decimal::from(86_400u32)).round_dp(1))
}

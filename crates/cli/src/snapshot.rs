//! Account-data snapshot loading.
//!
//! A snapshot is a JSON document holding the curve parameters, the floating
//! pool totals and one entry per maturity pool. Figures are human-readable
//! decimal strings and are converted to WAD without going through floats:
//!
//! ```json
//! {
//!   "curve": { "a": "0.01", "b": "0.005", "u_max": "0.9" },
//!   "market": {
//!     "total_floating_deposits": "10000",
//!     "total_floating_borrows": "0",
//!     "floating_backup_borrowed": "0"
//!   },
//!   "pools": [
//!     { "maturity": 1702419200, "supplied": "0", "borrowed": "1000", "available": "50000" }
//!   ]
//! }
//! ```

use std::path::Path;

use alloy_primitives::{I256, U256};
use anyhow::{bail, Context, Result};
use installments_sim::math::to_signed;
use installments_sim::{CurveParameters, GlobalMarketState, PoolState};
use serde::Deserialize;

const WAD_DECIMALS: usize = 18;

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    curve: CurveEntry,
    market: MarketEntry,
    pools: Vec<PoolEntry>,
}

#[derive(Debug, Deserialize)]
struct CurveEntry {
    a: String,
    b: String,
    u_max: String,
}

#[derive(Debug, Deserialize)]
struct MarketEntry {
    total_floating_deposits: String,
    total_floating_borrows: String,
    floating_backup_borrowed: String,
    /// Derived from deposits and borrows when absent
    #[serde(default)]
    floating_utilization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoolEntry {
    maturity: u64,
    supplied: String,
    borrowed: String,
    /// Unlimited when absent; the curve ceiling still applies
    #[serde(default)]
    available: Option<String>,
}

/// A parsed snapshot with every figure in WAD.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub curve: CurveParameters,
    pub market: GlobalMarketState,
    /// Sorted by maturity
    pub pools: Vec<PoolState>,
}

/// Read and parse a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    parse_snapshot(&contents)
        .with_context(|| format!("Invalid snapshot: {}", path.display()))
}

pub fn parse_snapshot(json: &str) -> Result<Snapshot> {
    let file: SnapshotFile = serde_json::from_str(json).context("Malformed snapshot JSON")?;

    let curve = CurveParameters::new(
        parse_wad(&file.curve.a).context("curve.a")?,
        parse_signed_wad(&file.curve.b).context("curve.b")?,
        parse_wad(&file.curve.u_max).context("curve.u_max")?,
    )?;

    let deposits = parse_wad(&file.market.total_floating_deposits)
        .context("market.total_floating_deposits")?;
    let borrows = parse_wad(&file.market.total_floating_borrows)
        .context("market.total_floating_borrows")?;
    let backup = parse_wad(&file.market.floating_backup_borrowed)
        .context("market.floating_backup_borrowed")?;
    let mut market = GlobalMarketState::from_totals(deposits, borrows, backup);
    if let Some(utilization) = &file.market.floating_utilization {
        market.floating_utilization =
            Some(parse_wad(utilization).context("market.floating_utilization")?);
    }

    let mut pools = file
        .pools
        .iter()
        .map(|entry| -> Result<PoolState> {
            let available = match &entry.available {
                Some(value) => parse_wad(value)?,
                None => U256::MAX,
            };
            Ok(PoolState::new(
                entry.maturity,
                parse_wad(&entry.supplied)?,
                parse_wad(&entry.borrowed)?,
                available,
            ))
        })
        .collect::<Result<Vec<_>>>()
        .context("pools")?;
    pools.sort_by_key(|pool| pool.maturity);

    Ok(Snapshot {
        curve,
        market,
        pools,
    })
}

/// Parse a human-readable decimal string to WAD.
///
/// Digits past the 18th decimal are truncated.
pub fn parse_wad(value: &str) -> Result<U256> {
    let value = value.trim();
    let parts: Vec<&str> = value.split('.').collect();

    let (integer_part, fractional_part) = match parts.len() {
        1 => (parts[0], ""),
        2 => (parts[0], parts[1]),
        _ => bail!("Invalid amount format: {}", value),
    };
    if integer_part.is_empty() && fractional_part.is_empty() {
        bail!("Invalid amount format: {:?}", value);
    }
    if !integer_part
        .chars()
        .chain(fractional_part.chars())
        .all(|c| c.is_ascii_digit())
    {
        bail!("Invalid amount format: {}", value);
    }

    let fractional = if fractional_part.len() > WAD_DECIMALS {
        &fractional_part[..WAD_DECIMALS]
    } else {
        fractional_part
    };
    let fractional = format!("{:0<width$}", fractional, width = WAD_DECIMALS);

    let combined = format!("{}{}", integer_part, fractional);
    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(combined, 10).with_context(|| format!("Failed to parse amount: {}", value))
}

/// Parse a decimal string that may carry a leading minus sign.
pub fn parse_signed_wad(value: &str) -> Result<I256> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let magnitude = to_signed(parse_wad(digits)?)
        .with_context(|| format!("Amount out of range: {}", value))?;
    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use installments_sim::WAD;

    const SNAPSHOT: &str = r#"{
        "curve": { "a": "0.01", "b": "-0.002", "u_max": "0.9" },
        "market": {
            "total_floating_deposits": "10000",
            "total_floating_borrows": "2500",
            "floating_backup_borrowed": "1500"
        },
        "pools": [
            { "maturity": 200, "supplied": "0", "borrowed": "4000", "available": "100" },
            { "maturity": 100, "supplied": "250.5", "borrowed": "1000" }
        ]
    }"#;

    #[test]
    fn test_parse_wad() {
        assert_eq!(parse_wad("1").unwrap(), WAD);
        assert_eq!(parse_wad("0.5").unwrap(), WAD / U256::from(2));
        assert_eq!(parse_wad(".25").unwrap(), WAD / U256::from(4));
        assert_eq!(parse_wad("10000").unwrap(), U256::from(10_000) * WAD);
        assert_eq!(parse_wad("0").unwrap(), U256::ZERO);
        assert_eq!(
            parse_wad("0.0000000000000000019").unwrap(),
            U256::from(1)
        );
    }

    #[test]
    fn test_parse_wad_rejects_garbage() {
        assert!(parse_wad("").is_err());
        assert!(parse_wad("1.2.3").is_err());
        assert!(parse_wad("-1").is_err());
        assert!(parse_wad("1e18").is_err());
        assert!(parse_wad("abc").is_err());
        assert!(parse_wad("1_000").is_err());
    }

    #[test]
    fn test_parse_signed_wad() {
        assert_eq!(
            parse_signed_wad("-0.02").unwrap(),
            -I256::from_raw(U256::from(20_000_000_000_000_000u64))
        );
        assert_eq!(parse_signed_wad("1").unwrap(), I256::from_raw(WAD));
        assert!(parse_signed_wad("--1").is_err());
    }

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(SNAPSHOT).unwrap();

        assert!(snapshot.curve.b.is_negative());
        assert_eq!(snapshot.market.total_floating_deposits, U256::from(10_000) * WAD);
        // Derived: 2500 / 10000
        assert_eq!(
            snapshot.market.floating_utilization,
            Some(U256::from(250_000_000_000_000_000u64))
        );

        // Sorted by maturity
        assert_eq!(snapshot.pools[0].maturity, 100);
        assert_eq!(snapshot.pools[0].available, U256::MAX);
        assert_eq!(
            snapshot.pools[0].supplied,
            U256::from(2_505) * WAD / U256::from(10)
        );
        assert_eq!(snapshot.pools[1].available, U256::from(100) * WAD);
    }

    #[test]
    fn test_parse_empty_market() {
        let empty = SNAPSHOT.replace(
            r#""total_floating_deposits": "10000""#,
            r#""total_floating_deposits": "0""#,
        );
        let snapshot = parse_snapshot(&empty).unwrap();
        assert_eq!(snapshot.market.floating_utilization, None);
    }

    #[test]
    fn test_parse_snapshot_errors() {
        assert!(parse_snapshot("{}").is_err());

        let bad_curve = SNAPSHOT.replace(r#""u_max": "0.9""#, r#""u_max": "0""#);
        assert!(parse_snapshot(&bad_curve).is_err());

        let bad_amount = SNAPSHOT.replace(r#""borrowed": "1000""#, r#""borrowed": "lots""#);
        assert!(parse_snapshot(&bad_amount).is_err());
    }
}

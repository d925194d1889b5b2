//! Test helper utilities for CLI integration tests.

#![allow(deprecated)] // Command::cargo_bin deprecation

use assert_cmd::Command;

/// Timestamp one interval before the fixture's first maturity.
pub const NOW: &str = "1700000000";

/// First maturity in the fixture snapshot.
pub const FIRST_MATURITY: &str = "1702419200";

/// Four weeks.
pub const INTERVAL: &str = "2419200";

/// Create a CLI command with logging and the environment fallbacks cleared.
pub fn installments_cmd() -> Command {
    let mut cmd = Command::cargo_bin("installments").unwrap();
    cmd.env_remove("INSTALLMENTS_SNAPSHOT")
        .env_remove("INSTALLMENTS_NOW")
        .env_remove("RUST_LOG");
    cmd
}

/// Snapshot fixture with pools at 10%, 40% and 70% utilization.
pub const SNAPSHOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/snapshot.json");

/// Snapshot fixture whose floating pool holds no deposits.
pub const EMPTY_MARKET: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/empty_market.json");

/// A `plan` command for the fixture snapshot with the given amount and count.
pub fn plan_cmd(amount: &str, count: &str) -> Command {
    let mut cmd = installments_cmd();
    cmd.args([
        "plan",
        "--snapshot",
        SNAPSHOT,
        "--amount",
        amount,
        "--count",
        count,
        "--first-maturity",
        FIRST_MATURITY,
        "--interval",
        INTERVAL,
        "--now",
        NOW,
    ]);
    cmd
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Parse a decimal string field into a float for coarse comparisons.
pub fn as_f64(value: &serde_json::Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

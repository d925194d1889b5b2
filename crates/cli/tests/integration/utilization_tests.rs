//! Utilization command tests.

use predicates::prelude::*;

use super::helpers::{installments_cmd, stdout_json, EMPTY_MARKET, SNAPSHOT};

#[test]
fn test_utilization_json() {
    let json = stdout_json(installments_cmd().args([
        "--format",
        "json",
        "utilization",
        "--snapshot",
        SNAPSHOT,
    ]));

    assert_eq!(json["global_utilization"], "0");
    assert_eq!(json["free_liquidity"], "10000");

    let pools = json["pools"].as_array().unwrap();
    assert_eq!(pools.len(), 3);
    assert_eq!(pools[0]["utilization"], "0.1");
    assert_eq!(pools[0]["rate"], "0.0175");
    assert_eq!(pools[2]["utilization"], "0.7");
    assert_eq!(pools[2]["backup_borrowed"], "7000");
}

#[test]
fn test_utilization_empty_market_is_undefined() {
    let json = stdout_json(installments_cmd().args([
        "--format",
        "json",
        "utilization",
        "--snapshot",
        EMPTY_MARKET,
    ]));

    assert!(json["floating_utilization"].is_null());
    assert!(json["global_utilization"].is_null());
    assert!(json["pools"][0]["utilization"].is_null());
    assert!(json["pools"][0]["rate"].is_null());

    installments_cmd()
        .args(["utilization", "--snapshot", EMPTY_MARKET])
        .assert()
        .success()
        .stdout(predicate::str::contains("Floating Util:   undefined"));
}

#[test]
fn test_utilization_table() {
    installments_cmd()
        .args(["utilization", "--snapshot", SNAPSHOT])
        .assert()
        .success()
        .stdout(predicate::str::contains("Floating Pool"))
        .stdout(predicate::str::contains("Capacity"))
        .stdout(predicate::str::contains("1704838400"));
}

#[test]
fn test_utilization_env_snapshot() {
    installments_cmd()
        .env("INSTALLMENTS_SNAPSHOT", SNAPSHOT)
        .arg("utilization")
        .assert()
        .success()
        .stdout(predicate::str::contains("Market Snapshot"));
}

//! Plan command tests.

use predicates::prelude::*;

use super::helpers::{
    as_f64, installments_cmd, plan_cmd, stdout_json, FIRST_MATURITY, INTERVAL, NOW, SNAPSHOT,
};

#[test]
fn test_plan_table_output() {
    plan_cmd("10000", "3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Principal"))
        .stdout(predicate::str::contains("1702419200"))
        .stdout(predicate::str::contains("1707257600"))
        .stdout(predicate::str::contains("Effective Rate"))
        .stdout(predicate::str::contains("Converged"));
}

#[test]
fn test_plan_json_output() {
    let json = stdout_json(plan_cmd("10000", "3").args(["--format", "json"]));

    assert_eq!(json["converged"], true);
    assert_eq!(json["total_principal"], "10000");
    assert_eq!(json["now"], 1_700_000_000u64);

    let installments = json["installments"].as_array().unwrap();
    assert_eq!(installments.len(), 3);

    // The least utilized pool takes the most principal
    let principals: Vec<f64> = installments.iter().map(|i| as_f64(&i["principal"])).collect();
    assert!(principals[0] > principals[1]);
    assert!(principals[1] > principals[2]);
    assert!((principals.iter().sum::<f64>() - 10_000.0).abs() < 1e-6);

    for installment in installments {
        assert!((as_f64(&installment["rate"]) - 0.065).abs() < 0.002);
        assert!(as_f64(&installment["repay"]) >= as_f64(&installment["principal"]));
    }
}

#[test]
fn test_plan_env_fallbacks() {
    let output = installments_cmd()
        .env("INSTALLMENTS_SNAPSHOT", SNAPSHOT)
        .env("INSTALLMENTS_NOW", NOW)
        .args([
            "--format",
            "json",
            "plan",
            "--amount",
            "1500",
            "--count",
            "2",
            "--first-maturity",
            FIRST_MATURITY,
            "--interval",
            INTERVAL,
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_principal"], "1500");
    assert_eq!(json["installments"].as_array().unwrap().len(), 2);
}

#[test]
fn test_plan_folds_maturities_past_last_pool() {
    let json = stdout_json(plan_cmd("5000", "5").args(["--format", "json"]));

    let installments = json["installments"].as_array().unwrap();
    assert_eq!(installments.len(), 3);
    assert_eq!(installments[2]["maturity"], 1_707_257_600u64);
    assert_eq!(json["total_principal"], "5000");
}

#[test]
fn test_plan_table_notes_folded_maturities() {
    plan_cmd("5000", "5")
        .assert()
        .success()
        .stdout(predicate::str::contains("folded into the last maturity"));
}

#[test]
fn test_plan_iteration_cap() {
    let json = stdout_json(
        plan_cmd("10000", "3").args(["--max-iterations", "0", "--format", "json"]),
    );
    assert_eq!(json["converged"], false);
    assert_eq!(json["iterations"], 0);
    assert_eq!(json["total_principal"], "10000");
}

#[test]
fn test_plan_insufficient_capacity() {
    plan_cmd("1000000", "3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient capacity"));
}

#[test]
fn test_plan_unknown_maturity() {
    installments_cmd()
        .args([
            "plan",
            "--snapshot",
            SNAPSHOT,
            "--amount",
            "100",
            "--count",
            "2",
            "--first-maturity",
            "1702419201",
            "--interval",
            INTERVAL,
            "--now",
            NOW,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No pool found for maturity 1702419201"));
}

#[test]
fn test_plan_matured_pool() {
    installments_cmd()
        .args([
            "plan",
            "--snapshot",
            SNAPSHOT,
            "--amount",
            "100",
            "--count",
            "2",
            "--first-maturity",
            FIRST_MATURITY,
            "--interval",
            INTERVAL,
            "--now",
            FIRST_MATURITY,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not after current time"));
}

#[test]
fn test_plan_zero_count() {
    plan_cmd("100", "0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("installment count must be at least 1"));
}

#[test]
fn test_plan_invalid_amount() {
    plan_cmd("ten", "3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --amount"));
}

#[test]
fn test_plan_missing_snapshot_file() {
    installments_cmd()
        .args([
            "plan",
            "--snapshot",
            "/nonexistent/snapshot.json",
            "--amount",
            "100",
            "--count",
            "2",
            "--first-maturity",
            FIRST_MATURITY,
            "--interval",
            INTERVAL,
            "--now",
            NOW,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

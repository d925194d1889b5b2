//! Rate command tests.

use predicates::prelude::*;

use super::helpers::{as_f64, installments_cmd, stdout_json};

#[test]
fn test_rate_point_json() {
    let json = stdout_json(installments_cmd().args([
        "--format",
        "json",
        "rate",
        "--a",
        "0.01",
        "--b",
        "0.005",
        "--u-max",
        "0.9",
        "--utilization",
        "0.4",
    ]));

    assert_eq!(json["rate"], "0.025");
    assert!(json.get("to").is_none());
    assert!((as_f64(&json["slope"]) - 0.04).abs() < 1e-5);
}

#[test]
fn test_rate_negative_offset() {
    let json = stdout_json(installments_cmd().args([
        "--format",
        "json",
        "rate",
        "--a",
        "0.01",
        "--b",
        "-0.02",
        "--u-max",
        "0.9",
        "--utilization",
        "0.8",
    ]));

    assert_eq!(json["b"], "-0.02");
    assert_eq!(json["rate"], "0.08");
}

#[test]
fn test_rate_interval_average() {
    let json = stdout_json(installments_cmd().args([
        "--format",
        "json",
        "rate",
        "--a",
        "0.01",
        "--b",
        "0.005",
        "--u-max",
        "0.9",
        "--utilization",
        "0.4",
        "--to",
        "0.8",
    ]));

    assert_eq!(json["to"], "0.8");
    let rate = as_f64(&json["rate"]);
    assert!(rate > 0.025 && rate < 0.105);
}

#[test]
fn test_rate_table_output() {
    installments_cmd()
        .args([
            "rate",
            "--a",
            "0.01",
            "--b",
            "0.005",
            "--u-max",
            "0.9",
            "--utilization",
            "0.4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed Rate Curve"))
        .stdout(predicate::str::contains("2.500%"));
}

#[test]
fn test_rate_at_ceiling() {
    installments_cmd()
        .args([
            "rate",
            "--a",
            "0.01",
            "--b",
            "0.005",
            "--u-max",
            "0.9",
            "--utilization",
            "0.9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Utilization rate exceeded"));
}

#[test]
fn test_rate_backwards_interval() {
    installments_cmd()
        .args([
            "rate",
            "--a",
            "0.01",
            "--b",
            "0.005",
            "--u-max",
            "0.9",
            "--utilization",
            "0.5",
            "--to",
            "0.4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid utilization interval"));
}

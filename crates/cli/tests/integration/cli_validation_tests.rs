//! CLI argument validation tests.
//!
//! These tests verify that the CLI properly validates arguments and provides
//! helpful error messages.

use predicates::prelude::*;

use super::helpers::installments_cmd;

#[test]
fn test_help_output() {
    installments_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("installments"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("rate"))
        .stdout(predicate::str::contains("utilization"));
}

#[test]
fn test_plan_help_output() {
    installments_cmd()
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--first-maturity"))
        .stdout(predicate::str::contains("--tolerance"))
        .stdout(predicate::str::contains("INSTALLMENTS_SNAPSHOT"));
}

#[test]
fn test_invalid_command() {
    installments_cmd()
        .arg("invalid_command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_plan_missing_arguments() {
    installments_cmd()
        .args(["plan", "--amount", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_utilization_missing_snapshot() {
    installments_cmd()
        .arg("utilization")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_invalid_format_value() {
    installments_cmd()
        .args(["--format", "xml", "utilization", "--snapshot", "x.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_invalid_count_value() {
    installments_cmd()
        .args([
            "plan",
            "--snapshot",
            "x.json",
            "--amount",
            "100",
            "--count",
            "three",
            "--first-maturity",
            "1",
            "--interval",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

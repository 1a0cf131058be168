use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_evaluate_numeric_range() {
    let rule = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/documents/range.json");

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("evaluate").arg(rule).arg("4").arg("11").arg("null");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Value '4' is between 0 and 10"))
        .stdout(predicate::str::contains("Value '11' should be between 0 and 10"))
        .stdout(predicate::str::contains("No value to validate"))
        .stdout(predicate::str::contains("n/a"));
}

#[test]
fn test_cli_evaluate_reads_text_values() {
    let temp_dir = TempDir::new().unwrap();
    let rule = temp_dir.path().join("email.json");
    fs::write(&rule, r#"[{"vtype": "emailValidator", "config": {}}]"#).unwrap();

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("evaluate")
        .arg(&rule)
        .arg("support@ke-chain.com")
        .arg("not an address");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("emailValidator"))
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("invalid"));
}

#[test]
fn test_cli_evaluate_rejects_unknown_rule() {
    let temp_dir = TempDir::new().unwrap();
    let rule = temp_dir.path().join("rule.json");
    fs::write(&rule, r#"{"vtype": "primeNumberValidator", "config": {}}"#).unwrap();

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("evaluate").arg(&rule).arg("7");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown type"))
        .stderr(predicate::str::contains("primeNumberValidator"));
}

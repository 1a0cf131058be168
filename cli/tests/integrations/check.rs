use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fixtures() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_cli_check_valid_documents() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("check").arg(fixtures().join("documents"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("range.json"))
        .stdout(predicate::str::contains("validator"))
        .stdout(predicate::str::contains("property options"))
        .stdout(predicate::str::contains("2 of 2 document(s) valid"));
}

#[test]
fn test_cli_check_reports_unknown_validator() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("bad.json"),
        r#"{"vtype": "colourValidator", "config": {}}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("good.json"),
        r#"{"vtype": "evenNumberValidator", "config": {}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("check").arg(temp_dir.path());

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("colourValidator"))
        .stdout(predicate::str::contains("1 of 2 document(s) valid"))
        .stderr(predicate::str::contains("1 of 2 document(s) failed"));
}

#[test]
fn test_cli_check_marks_broken_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("broken.json");
    fs::write(&file, "{\n  \"effect\": \n}").unwrap();

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("check").arg(&file);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("invalid JSON"))
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn test_cli_check_skips_other_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not json").unwrap();

    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("check").arg(temp_dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No JSON documents found."));
}

#[test]
fn test_cli_check_missing_path() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("check").arg("/nonexistent/kechain/documents");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

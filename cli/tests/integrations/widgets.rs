use assert_cmd::Command;
use predicates::prelude::*;

fn fixture() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pump.json")
}

#[test]
fn test_cli_widgets_lists_activity_widgets() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("widgets")
        .arg(fixture())
        .arg("e2a7c4f9-1b3d-4e68-8a0c-7f5b9d2e4a13");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Inspect impeller"))
        .stdout(predicate::str::contains("propertyGridWidget"))
        .stdout(predicate::str::contains("Impeller data"))
        .stdout(predicate::str::contains("htmlWidget"))
        .stdout(predicate::str::contains("(hidden)"))
        .stdout(predicate::str::contains("in columns-1"));
}

#[test]
fn test_cli_widgets_empty_activity() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("widgets")
        .arg(fixture())
        .arg("8c6f1e3b-5a9d-4c27-b40e-2d7a9f1c5e86");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Activity 'Sign off' has no widgets."));
}

#[test]
fn test_cli_widgets_unknown_activity() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("widgets")
        .arg(fixture())
        .arg("00000000-0000-4000-8000-000000000000");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_cli_widgets_rejects_malformed_id() {
    let mut cmd = Command::cargo_bin("kechain").unwrap();
    cmd.arg("widgets").arg(fixture()).arg("impeller");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Illegal argument"));
}

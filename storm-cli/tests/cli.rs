//! Integration tests for storm-cli

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Command-line tool for listing and extracting MPQ archives",
        ));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("storm-cli"));
}

#[test]
fn test_list_command_help() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("list")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("List files in one or more archives"))
        .stdout(predicate::str::contains("--filter"));
}

#[test]
fn test_extract_command_help() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target"));
}

#[test]
fn test_missing_archive() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("list").assert().failure();
}

#[test]
fn test_missing_library_fails() {
    let dir = tempfile::tempdir().unwrap();
    let library = dir.path().join("libstorm-missing.so");

    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.env("HOME", dir.path())
        .env("STORMLIB_PATH", &library)
        .arg("list")
        .arg("d2data.mpq")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load StormLib"));
}

#[test]
fn test_library_flag_overrides_environment() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.env("HOME", dir.path())
        .env("STORMLIB_PATH", dir.path().join("from-env.so"))
        .arg("--library")
        .arg(dir.path().join("from-flag.so"))
        .arg("extract")
        .arg("d2data.mpq")
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-flag.so"));
}

#[test]
fn test_invalid_filter_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.env("HOME", dir.path())
        .arg("--library")
        .arg(dir.path().join("libstorm.so"))
        .arg("list")
        .arg("d2data.mpq")
        .arg("--filter")
        .arg("[a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter"));
}

//! Integration tests for shell completion

use assert_cmd::Command;
use predicates::prelude::*;

fn completion(shell: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("completion").arg(shell).assert().success()
}

#[test]
fn test_completion_command_exists() {
    let mut cmd = Command::cargo_bin("storm-cli").unwrap();
    cmd.arg("completion")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate completion scripts"));
}

#[test]
fn test_generate_bash_completion() {
    completion("bash")
        .stdout(predicate::str::contains("complete -F"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("--library"))
        .stdout(predicate::str::contains("--filter"))
        .stdout(predicate::str::contains("--target"));
}

#[test]
fn test_generate_zsh_completion() {
    completion("zsh")
        .stdout(predicate::str::contains("#compdef storm-cli"))
        .stdout(predicate::str::contains("--library"))
        .stdout(predicate::str::contains("--filter"))
        .stdout(predicate::str::contains("--target"));
}

#[test]
fn test_generate_fish_completion() {
    completion("fish")
        .stdout(predicate::str::contains("complete -c storm-cli"))
        .stdout(predicate::str::contains("-l library"))
        .stdout(predicate::str::contains("-l filter"))
        .stdout(predicate::str::contains("-l target"));
}

#[test]
fn test_generate_powershell_completion() {
    completion("powershell").stdout(predicate::str::contains("storm-cli"));
}

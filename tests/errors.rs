use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf-tape.toml");
    cmd
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+[")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid program: unmatched bracket '['")
            .and(predicate::str::contains("at instruction 1")));
}

#[test]
fn test_stray_close_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+.]")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket ']'"));
}

#[test]
fn test_invalid_program_has_no_side_effects() {
    // Output comes before the bad bracket, yet nothing may be printed.
    cargo_bin()
        .timeout(Duration::from_secs(2)).args(["run", ",.+++.]["])
        .write_stdin("A")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_caret_points_at_bracket() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).args(["run", "++]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("  ++]\n    ^"));
}

#[test]
fn test_unknown_characters_are_comments() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).args(["run", "+a+b+c."])
        .assert()
        .success()
        .stdout("\u{3}");
}

#[test]
fn test_runner_reports_invalid_program() {
    Command::cargo_bin("bf_runner")
        .unwrap()
        .arg("]")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket"));
}

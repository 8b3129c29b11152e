use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf-tape.toml")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_stdout_only_for_program_output() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "+++."])
        .assert()
        .stdout("\u{3}")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_stderr_only_for_abort_messages() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--timeout", "100", "+.[]"])
        .assert()
        .stdout("\u{1}")
        .stderr(predicate::str::contains("Execution aborted"));
}

#[test]
fn test_logs_go_to_stderr() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("RUST_LOG", "debug")
        .args(["run", "+++."])
        .assert()
        .success()
        .stdout("\u{3}")
        .stderr(predicate::str::contains("run complete"));
}

#[test]
fn test_run_start_logs_the_mode() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("RUST_LOG", "debug")
        .args(["run", "--debug", "+"])
        .assert()
        .success()
        .stderr(predicate::str::contains("run starting").and(predicate::str::contains("debug_mode=true")));
}

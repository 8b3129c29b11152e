use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn check_accepts_balanced_program() {
    cargo_bin()
        .args(["check", "+[->[-]<]"])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_rejects_negative_prefix() {
    cargo_bin()
        .args(["check", "][" ])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket ']'").and(predicate::str::contains("at instruction 0")));
}

#[test]
fn check_does_not_run_the_program() {
    cargo_bin()
        .args(["check", ",+[]."])
        .write_stdin("x")
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_reads_from_file() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "[[]").unwrap();
    cargo_bin()
        .arg("check").arg("--file").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched bracket '['"));
}

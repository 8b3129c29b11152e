// Exercises the ',' (input) instruction by providing bytes on stdin.
use assert_cmd::Command;

#[test]
fn runner_reads_from_stdin_and_echoes_byte() {
    let mut cmd = Command::cargo_bin("bf_runner")
        .expect("failed to locate bf_runner binary");

    cmd.arg(",.")
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z");
}

#[test]
fn run_echoes_byte_65() {
    Command::cargo_bin("bf")
        .unwrap()
        .env("BF_CONFIG", "/nonexistent/bf-tape.toml")
        .env_remove("BF_EOF")
        .args(["run", ",."])
        .write_stdin(vec![65u8])
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn cat_program_copies_stdin() {
    Command::cargo_bin("bf_runner")
        .unwrap()
        .arg(",[.,]")
        .write_stdin("line one\nline two\n")
        .assert()
        .success()
        .stdout("line one\nline two\n");
}

#[test]
fn eof_writes_zero_by_default() {
    Command::cargo_bin("bf_runner")
        .unwrap()
        .arg("+++,.")
        .write_stdin("")
        .assert()
        .success()
        .stdout("\u{0}");
}

#[test]
fn eof_unchanged_keeps_the_cell() {
    Command::cargo_bin("bf")
        .unwrap()
        .env("BF_CONFIG", "/nonexistent/bf-tape.toml")
        .args(["run", "--eof", "unchanged", "+++,."])
        .write_stdin("")
        .assert()
        .success()
        .stdout("\u{3}");
}

#[test]
fn eof_policy_from_env() {
    Command::cargo_bin("bf")
        .unwrap()
        .env("BF_CONFIG", "/nonexistent/bf-tape.toml")
        .env("BF_EOF", "unchanged")
        .args(["run", "+++,."])
        .write_stdin("")
        .assert()
        .success()
        .stdout("\u{3}");
}

#[test]
fn runner_passes_high_bytes_through_unchanged() {
    Command::cargo_bin("bf_runner")
        .unwrap()
        .arg(",.")
        .write_stdin(vec![0xE9u8])
        .assert()
        .success()
        .stdout(vec![0xE9u8]);
}

#[test]
fn run_writes_cell_values_as_single_bytes() {
    // 200 is not valid UTF-8 on its own; it must not be re-encoded.
    let program = format!("{}.", "+".repeat(200));
    Command::cargo_bin("bf")
        .unwrap()
        .env("BF_CONFIG", "/nonexistent/bf-tape.toml")
        .args(["run", &program])
        .assert()
        .success()
        .stdout(vec![200u8]);
}

#[cfg(unix)]
#[test]
fn unreadable_stdin_is_an_error_not_end_of_input() {
    use std::process::Stdio;

    // A directory opens fine but every read on it fails.
    let dir = std::fs::File::open("/").expect("open /");
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_bf_runner"))
        .arg(",+.")
        .stdin(Stdio::from(dir))
        .output()
        .expect("run bf_runner");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "no output after a failed read");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("I/O error"), "stderr: {stderr}");
    assert!(stderr.contains("at instruction 0"), "stderr: {stderr}");
}

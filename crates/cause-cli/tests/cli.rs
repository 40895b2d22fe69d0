// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runs the `cause` binary end to end.

use std::io::Write;
use std::process::{Command, Output};

fn cause(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cause"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cause")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn lex_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "a + b").unwrap();
    let output = cause(&["lex", file.path().to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Lex OK"));
}

#[test]
fn lex_error_points_at_the_character() {
    let output = cause(&["lex", "-e", "a #"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Unexpected character '#'"), "{}", err);
    assert!(err.contains("line 1:3"), "{}", err);
}

#[test]
fn parse_prints_the_expression() {
    let output = cause(&["parse", "-e", "a+b*c"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("a + b * c\n"));
}

#[test]
fn parse_failure_exits_nonzero() {
    let output = cause(&["parse", "-e", "1 +"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Parse FAILED"));
}

#[test]
fn compile_shows_type_and_code() {
    let output = cause(&["compile", "-e", "δ[load](k) + b"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("type: State"), "{}", out);
    assert!(out.contains("free: load, k, b"), "{}", out);
    assert!(out.contains(r#"return δ.depend(true, δ.operators["+"], δ(load(k)), δ.success(b))"#), "{}", out);
}

#[test]
fn compile_with_symbols_and_namespace() {
    let output = cause(&["compile", "--namespace", "rt", "--symbol", "load", "-e", "rt[load](k)"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("free: k\n"), "{}", out);
    assert!(out.contains("return rt(load(k))"), "{}", out);
}

#[test]
fn undecidable_is_reported_with_location() {
    let output = cause(&["compile", "-e", "t ? (x) => x : δ[load]"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("too hard to figure out"), "{}", err);
    assert!(err.contains("line 1:1"), "{}", err);
}

#[test]
fn run_with_bindings() {
    let output = cause(&["run", "-e", "a + 1", "--bind", "a=41"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "42\n");
}

#[test]
fn run_resolves_dependencies() {
    let output = cause(&[
        "run",
        "-e",
        "δ[load](k) * 2",
        "--lookup",
        r#"load={"x": 21}"#,
        "--bind",
        "k=x",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "42\n");
}

#[test]
fn strict_run_requires_every_binding() {
    let output = cause(&["run", "--strict", "-e", "a + b", "--bind", "a=1"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no binding for free variable(s): b"));
}

#[test]
fn lenient_run_fails_only_when_read() {
    let output = cause(&["run", "-e", "a || b", "--bind", "a=true"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "true\n");
    assert!(stderr(&output).contains("no binding for free variable(s): b"));
}

#[cfg(unix)]
#[test]
fn spawn_reports_exit_code() {
    let output = cause(&["spawn", "--", "/bin/sh", "-c", "exit 3"]);
    assert_eq!(output.status.code(), Some(3));
    let out = stdout(&output);
    assert!(out.contains("started pid"), "{}", out);
    assert!(out.contains("exited exit 3"), "{}", out);
}

#[cfg(unix)]
#[test]
fn spawn_timeout_interrupts_the_child() {
    let output = cause(&["spawn", "--timeout", "1", "--", "/bin/sh", "-c", "exec sleep 30"]);
    assert_eq!(output.status.code(), Some(130));
    assert!(stdout(&output).contains("killed by signal"));
}

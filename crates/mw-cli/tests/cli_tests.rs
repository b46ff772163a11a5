//! Integration tests for the `mw` CLI binary.
//!
//! These exercise the `parse`, `check`, and `json` subcommands through the
//! actual binary, including stdin/stdout piping, file I/O, and error
//! reporting.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn parse_stdin_prints_debug_form() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("parse")
        .write_stdin("name: Alice\nage: 30\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("30"));
}

#[test]
fn parse_json_flag_emits_json() {
    Command::cargo_bin("mw")
        .unwrap()
        .args(["parse", "--json"])
        .write_stdin("name: Alice\nscores:\n  - 1\n  - 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\""))
        .stdout(predicate::str::contains("\"Alice\""));
}

#[test]
fn parse_file_to_file() {
    let input_path = "/tmp/mw-test-parse-input.mw";
    let output_path = "/tmp/mw-test-parse-output.txt";
    std::fs::write(input_path, "a: 1\nb: 2\n").unwrap();
    let _ = std::fs::remove_file(output_path);

    Command::cargo_bin("mw")
        .unwrap()
        .args(["parse", "-i", input_path, "-o", output_path])
        .assert()
        .success();

    let content = std::fs::read_to_string(output_path).expect("output file must exist");
    assert!(content.contains('a'));

    let _ = std::fs::remove_file(input_path);
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn parse_invalid_input_fails() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("parse")
        .write_stdin("\"unterminated\nmore\n")
        .assert()
        .failure();
}

#[test]
fn check_valid_input_reports_ok() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("check")
        .write_stdin("a: 1\nb: 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_invalid_input_fails_with_message() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("check")
        .write_stdin("\"unterminated\nmore\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line"));
}

#[test]
fn json_subcommand_reformats_input() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("json")
        .write_stdin(r#"{"name": "Alice", "age": 30}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Alice\""));
}

#[test]
fn json_subcommand_rejects_mw_only_syntax() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("json")
        .write_stdin("name: Alice\n")
        .assert()
        .failure();
}

#[test]
fn help_flag_shows_usage() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("json"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("mw")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("unrecognized")));
}

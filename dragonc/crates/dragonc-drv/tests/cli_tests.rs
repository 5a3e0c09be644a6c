//! CLI interface tests for the dragonc driver.
//!
//! These exercise the command-line surface: help, version, flags,
//! default output names, and failure reporting.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the path to the dragonc binary
fn dragonc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dragonc"))
}

/// Writes a source file into the temp dir.
fn write_source(dir: &TempDir, source: &str) -> PathBuf {
    let path = dir.path().join("prog.c");
    std::fs::write(&path, source).expect("failed to write source");
    path
}

#[test]
fn test_cli_help() {
    Command::new(dragonc_bin())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version() {
    Command::new(dragonc_bin())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dragonc"));
}

#[test]
fn test_cli_requires_input_file() {
    Command::new(dragonc_bin()).assert().failure();
}

#[test]
fn test_cli_missing_input_reported() {
    let dir = TempDir::new().unwrap();
    Command::new(dragonc_bin())
        .arg(dir.path().join("nonexistent.c"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_cli_dump_ast() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() { return 2; }");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("--dump-ast")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Function")
                .and(predicate::str::contains("main"))
                .and(predicate::str::contains("Return")),
        );

    // Dumping the AST produces no output artifact.
    assert!(!dir.path().join("a.out").exists());
}

#[test]
fn test_cli_assembly_flag_writes_text() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() { return 2; }");
    let output = dir.path().join("prog.s");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-S")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let asm = std::fs::read_to_string(&output).expect("assembly file missing");
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("movq $2, %rax"));
    assert!(asm.contains("ret"));
}

#[test]
fn test_cli_assembly_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() { return 0; }");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("--assembly")
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("a.s").exists());
}

#[test]
fn test_cli_verbose_reports_phases() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() { return 0; }");
    let output = dir.path().join("prog.s");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-S")
        .arg("-o")
        .arg(&output)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Parsing").and(predicate::str::contains("Generating")),
        );
}

#[test]
fn test_cli_quiet_by_default() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() { return 0; }");
    let output = dir.path().join("prog.s");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-S")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_cli_error_includes_position() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "int main() {\n    return @;\n}\n");
    let output = dir.path().join("prog.out");

    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("2:12").and(predicate::str::contains("error")));
}

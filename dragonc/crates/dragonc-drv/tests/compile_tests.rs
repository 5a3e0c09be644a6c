//! End-to-end compilation tests.
//!
//! Valid programs are compiled to native executables and run; their
//! exit codes are checked directly and against the system C compiler on
//! the same source. Invalid programs must fail without leaving an
//! output file behind.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

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

/// Compiles a valid program with dragonc, returning the executable path.
fn compile(dir: &TempDir, source: &str) -> PathBuf {
    let input = write_source(dir, source);
    let output = dir.path().join("dragonc.out");
    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    output
}

/// Runs an executable and returns its exit code.
fn exit_code(exe: &Path) -> i32 {
    StdCommand::new(exe)
        .status()
        .expect("failed to run compiled program")
        .code()
        .expect("program terminated by signal")
}

/// Asserts that a valid program exits with the expected code.
fn assert_exit(source: &str, expected: i32) {
    let dir = TempDir::new().unwrap();
    let exe = compile(&dir, source);
    assert_eq!(exit_code(&exe), expected, "source: {source}");
}

/// Asserts that an invalid program is rejected and that no output file
/// appears at the requested path.
fn assert_rejected(source: &str) {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, source);
    let output = dir.path().join("dragonc.out");
    Command::new(dragonc_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    assert!(
        !output.exists(),
        "invalid program left an output file: {source}"
    );
}

// =============================================================================
// VALID PROGRAMS
// =============================================================================

#[test]
fn test_return_constant() {
    assert_exit("int main() { return 2; }", 2);
}

#[test]
fn test_locals_and_addition() {
    assert_exit("int main() { int a = 1; int b = 2; return a + b; }", 3);
}

#[test]
fn test_if_else() {
    assert_exit("int main() { int a = 0; if (a) return 5; else return 7; }", 7);
}

#[test]
fn test_shadowed_variable_restored() {
    assert_exit("int main() { int a = 1; { int a = 2; } return a; }", 1);
}

#[test]
fn test_logical_operators() {
    assert_exit("int main() { return 1 && (0 || 1); }", 1);
}

#[test]
fn test_compound_assignments() {
    assert_exit("int main() { int a = 5; a += 3; a <<= 1; return a; }", 16);
}

#[test]
fn test_arithmetic() {
    assert_exit("int main() { return 10 - 3; }", 7);
    assert_exit("int main() { return 6 * 7; }", 42);
    assert_exit("int main() { return 100 / 7; }", 14);
    assert_exit("int main() { return 100 % 7; }", 2);
}

#[test]
fn test_shift_operand_order() {
    assert_exit("int main() { return 1 << 3; }", 8);
    assert_exit("int main() { return 255 >> 4; }", 15);
}

#[test]
fn test_comparisons_and_unary() {
    assert_exit("int main() { return 5 > 3; }", 1);
    assert_exit("int main() { return 3 == 4; }", 0);
    assert_exit("int main() { return !0; }", 1);
    assert_exit("int main() { return ~0 & 255; }", 255);
    assert_exit("int main() { return -(-5); }", 5);
}

#[test]
fn test_increment_decrement_semantics() {
    // Postfix yields the pre-update value, prefix the new one.
    assert_exit("int main() { int a = 5; int b = a++; return a * 10 + b; }", 65);
    assert_exit("int main() { int a = 5; int b = ++a; return a * 10 + b; }", 66);
    assert_exit("int main() { int a = 5; int b = a--; return a * 10 + b; }", 45);
}

#[test]
fn test_short_circuit_skips_side_effects() {
    assert_exit("int main() { int x = 1; 0 && (x = 5); return x; }", 1);
    assert_exit("int main() { int x = 1; 1 || (x = 5); return x; }", 1);
    assert_exit("int main() { int x = 1; 1 && (x = 5); return x; }", 5);
}

#[test]
fn test_ternary_and_comma() {
    assert_exit("int main() { int a = 3; return a > 2 ? 10 : 20; }", 10);
    assert_exit("int main() { int a; return (a = 4, a + 1); }", 5);
}

#[test]
fn test_fallthrough_returns_zero() {
    assert_exit("int main() { int a = 1; }", 0);
}

#[test]
fn test_dangling_else() {
    assert_exit(
        "int main() { int a = 1; int b = 0; if (a) if (b) return 1; else return 2; return 3; }",
        2,
    );
}

// =============================================================================
// REFERENCE COMPILER EQUIVALENCE
// =============================================================================

/// Valid programs whose observable behavior must match the system C
/// compiler on the same source.
const EQUIVALENCE_CORPUS: &[&str] = &[
    "int main() { return 2; }",
    "int main() { int a = 1; int b = 2; return a + b; }",
    "int main() { int a = 0; if (a) return 5; else return 7; }",
    "int main() { int a = 1; { int a = 2; } return a; }",
    "int main() { return 1 && (0 || 1); }",
    "int main() { int a = 5; a += 3; a <<= 1; return a; }",
    "int main() { return 1 << 3; }",
    "int main() { return 250 >> 3; }",
    "int main() { return 100 / 7 + 100 % 7; }",
    "int main() { int a = 2; int b = 3; return a * b + (a < b); }",
    "int main() { int a = 9; a -= 4; a *= 3; a /= 2; return a; }",
    "int main() { int a = 12; a &= 10; a |= 1; a ^= 2; return a; }",
    "int main() { int a = 3; return a > 2 ? 10 : 20; }",
    "int main() { int a; return (a = 4, a + 1); }",
    "int main() { int x = 1; 0 && (x = 5); return x; }",
    "int main() { int x = 1; 1 || (x = 5); return x; }",
    "int main() { int a = 5; int b = a++; return a * 10 + b; }",
    "int main() { int a = 5; int b = --a; return a * 10 + b; }",
    "int main() { int a = 1; int b = 0; if (a) if (b) return 1; else return 2; return 3; }",
    "int main() { int a = 1; }",
];

#[test]
fn test_equivalence_with_reference_compiler() {
    for source in EQUIVALENCE_CORPUS {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir, source);

        let ours = compile(&dir, source);

        let reference = dir.path().join("cc.out");
        let status = StdCommand::new("cc")
            .arg("-o")
            .arg(&reference)
            .arg(&input)
            .status()
            .expect("failed to run reference compiler");
        assert!(status.success(), "reference compiler rejected: {source}");

        assert_eq!(
            exit_code(&ours),
            exit_code(&reference),
            "exit code mismatch for: {source}"
        );
    }
}

// =============================================================================
// INVALID PROGRAMS
// =============================================================================

#[test]
fn test_undeclared_variable_rejected() {
    assert_rejected("int main() { return a; }");
}

#[test]
fn test_redeclaration_rejected() {
    assert_rejected("int main() { int a; int a; return 0; }");
}

#[test]
fn test_assignment_to_constant_rejected() {
    assert_rejected("int main() { 1 = 2; return 0; }");
}

#[test]
fn test_empty_return_rejected() {
    assert_rejected("int main() { return ; }");
}

#[test]
fn test_lexical_error_rejected() {
    assert_rejected("int main() { return 2$; }");
}

#[test]
fn test_out_of_scope_use_rejected() {
    assert_rejected("int main() { { int a = 1; } return a; }");
}

#[test]
fn test_trailing_tokens_rejected() {
    assert_rejected("int main() { return 0; } }");
}

#[test]
fn test_increment_of_constant_rejected() {
    assert_rejected("int main() { return 5++; }");
}

#[test]
fn test_unsupported_loop_keyword_rejected() {
    assert_rejected("int main() { while (1) return 0; }");
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_assembly_output_is_byte_identical_across_runs() {
    let source =
        "int main() { int a = 1; if (a && 2) { int b = a << 1; return b ? b : -b; } return 0; }";

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let dir = TempDir::new().unwrap();
        let input = write_source(&dir, source);
        let asm_path = dir.path().join("prog.s");
        Command::new(dragonc_bin())
            .arg(&input)
            .arg("-S")
            .arg("-o")
            .arg(&asm_path)
            .assert()
            .success();
        outputs.push(std::fs::read(&asm_path).expect("assembly missing"));
    }
    assert_eq!(outputs[0], outputs[1]);
}

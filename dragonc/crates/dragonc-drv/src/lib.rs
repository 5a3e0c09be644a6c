//! dragonc-drv - Compiler Driver
//!
//! ============================================================================
//! COMPILATION PIPELINE
//! ============================================================================
//!
//! The driver is the entry point and orchestrator for the pipeline. It
//! owns everything the phase crates deliberately do not: the filesystem,
//! the command line, the external toolchain, and the exit code.
//!
//! ```text
//! Source File (.c)
//!        │
//!        ▼
//!   [Read File]
//!        │
//!        ▼
//!   [Lexer + Parser] ──▶ AST            (dragonc-lex, dragonc-par)
//!        │
//!        ▼
//!   [Code Generation] ──▶ Assembly text (dragonc-gen)
//!        │
//!        ▼
//!   [Assemble + Link via cc] ──▶ Executable
//! ```
//!
//! Emit modes short-circuit the tail of the pipeline: `--dump-ast`
//! prints the AST and stops, `-S` writes the assembly text to the
//! output path and stops. Otherwise the assembly goes to a temporary
//! directory and the system C compiler driver assembles and links it,
//! so the C runtime provides startup and the `main` return value
//! becomes the process exit code.
//!
//! ERROR HANDLING:
//! ---------------
//! Any phase error aborts the compilation: the requested output path is
//! never created on failure and temporary artifacts vanish with their
//! directory. Diagnostics render as `file:line:col: message` when the
//! error carries a position. Exit code is 0 on success, 1 on any
//! compile, assemble, or link failure.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

use dragonc_gen::Codegen;
use dragonc_par::{Parser, Program};
use dragonc_util::Span;

/// Compiler configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input source file.
    pub input: PathBuf,

    /// Output path for the selected emit type.
    pub output: PathBuf,

    /// What to produce.
    pub emit: EmitType,

    /// Print per-phase progress on stderr.
    pub verbose: bool,
}

/// Emit type - what output to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitType {
    /// Print the AST to stdout and stop.
    Ast,
    /// Write assembly text to the output path.
    Asm,
    /// Assemble and link a native executable.
    #[default]
    Executable,
}

/// Runs one compilation according to the configuration.
pub fn run(config: &Config) -> Result<()> {
    let source = fs::read_to_string(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    if config.verbose {
        eprintln!("Parsing {}", config.input.display());
    }
    let program = parse(&source, &config.input)?;

    if config.emit == EmitType::Ast {
        println!("{program:#?}");
        return Ok(());
    }

    if config.verbose {
        eprintln!("Generating assembly");
    }
    let asm = Codegen::new()
        .generate(&program)
        .map_err(|e| diagnostic(&config.input, None, e))?;

    match config.emit {
        EmitType::Asm => {
            if config.verbose {
                eprintln!("Writing {}", config.output.display());
            }
            fs::write(&config.output, asm)
                .with_context(|| format!("failed to write {}", config.output.display()))?;
        }
        EmitType::Executable => assemble_and_link(&asm, &config.output, config.verbose)?,
        EmitType::Ast => unreachable!("handled above"),
    }

    Ok(())
}

/// Parses the source, converting phase errors into positioned
/// diagnostics.
fn parse(source: &str, input: &Path) -> Result<Program> {
    Parser::new(source)
        .parse()
        .map_err(|e| diagnostic(input, e.span(), e))
}

/// Writes the assembly into a temporary directory and hands it to the
/// system C toolchain, which assembles and links against the C runtime.
///
/// The temporary directory is dropped on every path out of here, so a
/// failed toolchain run leaves nothing behind.
fn assemble_and_link(asm: &str, output: &Path, verbose: bool) -> Result<()> {
    let dir = tempfile::tempdir().context("failed to create temporary directory")?;
    let asm_path = dir.path().join("out.s");
    fs::write(&asm_path, asm)
        .with_context(|| format!("failed to write {}", asm_path.display()))?;

    if verbose {
        eprintln!("Assembling and linking {}", output.display());
    }
    let status = Command::new("cc")
        .arg("-o")
        .arg(output)
        .arg(&asm_path)
        .status()
        .context("failed to run `cc`; is a C toolchain on PATH?")?;
    if !status.success() {
        bail!("assembler/linker exited with {status}");
    }
    Ok(())
}

/// Formats a phase error as `file:line:col: message`, or without the
/// position when the error does not carry one.
fn diagnostic(input: &Path, span: Option<Span>, message: impl Display) -> anyhow::Error {
    match span {
        Some(span) => anyhow::anyhow!("{}:{span}: {message}", input.display()),
        None => anyhow::anyhow!("{}: {message}", input.display()),
    }
}

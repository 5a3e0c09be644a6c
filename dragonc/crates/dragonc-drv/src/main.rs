//! dragonc CLI - entry point for the compiler driver.
//!
//! Argument parsing lives here; everything else is in the library so
//! the pipeline stays testable without a process boundary.

use std::path::PathBuf;

use clap::Parser;

use dragonc_drv::{run, Config, EmitType};

/// dragonc - a compiler for a small C subset targeting x86-64
#[derive(Parser, Debug)]
#[command(name = "dragonc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles a small C subset to x86-64 assembly", long_about = None)]
struct Cli {
    /// The file to compile
    file: PathBuf,

    /// The output file (defaults to a.out, or a.s with -S)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// Emit assembly text instead of an executable
    #[arg(short = 'S', long = "assembly")]
    assembly: bool,

    /// Print per-phase progress on stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let emit = if cli.dump_ast {
        EmitType::Ast
    } else if cli.assembly {
        EmitType::Asm
    } else {
        EmitType::Executable
    };
    let output = cli.output.unwrap_or_else(|| {
        PathBuf::from(match emit {
            EmitType::Asm => "a.s",
            _ => "a.out",
        })
    });

    let config = Config {
        input: cli.file,
        output,
        emit,
        verbose: cli.verbose,
    };

    if let Err(e) = run(&config) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

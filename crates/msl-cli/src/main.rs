//! The matrixscript parser CLI.
//!
//! Provides the `mslc` command with the following subcommands:
//!
//! - `mslc parse <file>` - Parse a source file and print its token tree
//!
//! Options:
//! - `--verbose` - Print a progress trace of every top-level construct as it is built
//! - `--json` - Print the token tree as JSON instead of Rust debug output

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mslc", version, about = "The matrixscript parser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a source file and print its token tree
    Parse {
        /// Path to the source file
        file: PathBuf,

        /// Print a progress trace of every top-level construct as it is built
        #[arg(long)]
        verbose: bool,

        /// Print the token tree as JSON instead of Rust debug output
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, verbose, json } => {
            if let Err(code) = run_parse(&file, verbose, json) {
                process::exit(code);
            }
        }
    }
}

/// Read `file`, parse it, and either print the resulting `Program` node or
/// report the first fatal parse error with `ariadne`. Returns the process
/// exit code to use on failure.
fn run_parse(file: &std::path::Path, verbose: bool, json: bool) -> Result<(), i32> {
    let source = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("error: failed to read '{}': {}", file.display(), e);
        1
    })?;

    match msl_parser::parse(&source, verbose) {
        Ok(program) => {
            if json {
                match serde_json::to_string_pretty(&program) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: failed to serialize token tree: {e}");
                        return Err(1);
                    }
                }
            } else {
                println!("{program:#?}");
            }
            Ok(())
        }
        Err(err) => {
            report_parse_error(&source, file, &err);
            Err(1)
        }
    }
}

/// Render a fatal parse error with `ariadne`, pointing at the offending
/// byte offset in the original source.
fn report_parse_error(source: &str, path: &std::path::Path, err: &msl_parser::ParseError) {
    use ariadne::{Label, Report, ReportKind, Source};

    let file_name = path.display().to_string();
    let start = err.span.start as usize;
    let end = (err.span.end as usize).max(start + 1);
    let message = err.to_string();

    let _ = Report::<(String, std::ops::Range<usize>)>::build(ReportKind::Error, (file_name.clone(), start..end))
        .with_message("parse error")
        .with_label(Label::new((file_name.clone(), start..end)).with_message(message))
        .finish()
        .eprint((file_name, Source::from(source)));
}

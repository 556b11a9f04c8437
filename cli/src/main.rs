mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use lockdiff::DiffError;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lockdiff")]
#[command(about = "Compare locking-plan permission exports and show changes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two permission exports")]
    Diff {
        #[arg(help = "Path to the current/source export")]
        source: String,
        #[arg(help = "Path to the planned/destination export")]
        destination: String,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, short, help = "Quiet mode: only show the summary")]
        quiet: bool,
        #[arg(long, short, help = "Verbose mode: show model statistics")]
        verbose: bool,
        #[arg(long, value_name = "CHAR", help = "CSV field separator (default ';')")]
        separator: Option<char>,
    },
    #[command(about = "Show information about a permission export")]
    Info {
        #[arg(help = "Path to the export")]
        path: String,
        #[arg(long, short, help = "List keys and cylinders with their titles")]
        verbose: bool,
        #[arg(long, value_name = "CHAR", help = "CSV field separator (default ';')")]
        separator: Option<char>,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            source,
            destination,
            format,
            quiet,
            verbose,
            separator,
        } => commands::diff::run(&source, &destination, format, quiet, verbose, separator),
        Commands::Info {
            path,
            verbose,
            separator,
        } => commands::info::run(&path, verbose, separator),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

/// Sink failures are the tool's own problem; everything else (unreadable
/// files, malformed exports) is an input problem.
fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<DiffError>())
}

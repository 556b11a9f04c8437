use crate::OutputFormat;
use crate::commands::source::{build_dialect, load_model};
use crate::output::{json, text};
use anyhow::{Context, Result};
use lockdiff::{DiffReport, JsonLinesSink, PermissionModel};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

pub fn run(
    source_path: &str,
    destination_path: &str,
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
    separator: Option<char>,
) -> Result<ExitCode> {
    let verbosity = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let dialect = build_dialect(separator)?;

    let source = load_model(source_path, &dialect)?;
    let destination = load_model(destination_path, &dialect)?;

    if format == OutputFormat::Jsonl {
        return run_streaming(&source.model, &destination.model);
    }

    let report =
        lockdiff::try_diff_models(&source.model, &destination.model).context("Diff failed")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Text => {
            text::write_text_report(
                &mut handle,
                &report,
                &source.model,
                &destination.model,
                verbosity,
            )?;
        }
        OutputFormat::Json => {
            json::write_json_report(&mut handle, &report)?;
        }
        OutputFormat::Jsonl => {
            unreachable!("JSONL handled by streaming path");
        }
    }

    Ok(exit_code_from_report(&report))
}

fn run_streaming(source: &PermissionModel, destination: &PermissionModel) -> Result<ExitCode> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = BufWriter::new(handle);
    let mut sink = JsonLinesSink::new(&mut writer);

    let summary = lockdiff::try_diff_models_streaming(source, destination, &mut sink)
        .context("Streaming diff failed")?;

    writer.flush()?;

    if summary.change_count == 0 {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(1))
    }
}

fn exit_code_from_report(report: &DiffReport) -> ExitCode {
    if report.is_empty() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

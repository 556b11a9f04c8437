use crate::commands::source::{SourceKind, build_dialect, load_model};
use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn run(path: &str, verbose: bool, separator: Option<char>) -> Result<ExitCode> {
    let dialect = build_dialect(separator)?;
    let loaded = load_model(path, &dialect)?;
    let model = &loaded.model;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let filename = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| path.into());

    let layout = match loaded.kind {
        SourceKind::MatrixCsv => "pivot matrix (CSV)",
        SourceKind::RoleWorkbook => "role workbook",
    };

    writeln!(handle, "Export: {}", filename)?;
    writeln!(handle, "Layout: {}", layout)?;
    writeln!(handle, "Keys: {}", model.key_count())?;
    writeln!(handle, "Cylinders: {}", model.cylinder_count())?;
    writeln!(handle, "Permissions: {}", model.permission_count())?;

    let ignored_keys = model.keys().filter(|k| k.ignore).count();
    let ignored_cylinders = model.cylinders().filter(|c| c.ignore).count();
    if ignored_keys > 0 {
        writeln!(handle, "Ignored keys: {}", ignored_keys)?;
    }
    if ignored_cylinders > 0 {
        writeln!(handle, "Ignored cylinders: {}", ignored_cylinders)?;
    }

    if verbose {
        writeln!(handle)?;
        writeln!(handle, "Keys:")?;
        for key in model.keys() {
            let marker = if key.ignore { " (ignored)" } else { "" };
            writeln!(
                handle,
                "  - \"{}\" [{}]{} opens {} cylinders",
                key.title(),
                key.id,
                marker,
                model.permitted_cylinder_ids(key).len()
            )?;
        }

        writeln!(handle)?;
        writeln!(handle, "Cylinders:")?;
        for cylinder in model.cylinders() {
            let marker = if cylinder.ignore { " (ignored)" } else { "" };
            writeln!(
                handle,
                "  - \"{}\" [{}]{}",
                cylinder.title(),
                cylinder.id,
                marker
            )?;
        }
    }

    Ok(ExitCode::from(0))
}

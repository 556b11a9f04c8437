use crate::commands::diff::Verbosity;
use anyhow::Result;
use lockdiff::{ChangeKind, ChangeRecord, DiffReport, PermissionModel};
use std::io::Write;

pub fn write_text_report<W: Write>(
    w: &mut W,
    report: &DiffReport,
    source: &PermissionModel,
    destination: &PermissionModel,
    verbosity: Verbosity,
) -> Result<()> {
    if report.is_empty() {
        writeln!(w, "No permission changes found.")?;
    } else if verbosity != Verbosity::Quiet {
        for record in &report.records {
            writeln!(w, "{}", render_record(record))?;
        }
        writeln!(w)?;
    }

    write_summary(w, report, source, destination, verbosity)?;

    Ok(())
}

fn render_record(record: &ChangeRecord) -> String {
    let verb = match record.kind {
        ChangeKind::Grant => "should now be permitted to open",
        ChangeKind::Revoke => "should no longer be permitted to open",
    };
    format!(
        "Key \"{}\" [{}] {} cylinder \"{}\" [{}]",
        record.key_title, record.key_id, verb, record.cylinder_title, record.cylinder_id
    )
}

fn write_summary<W: Write>(
    w: &mut W,
    report: &DiffReport,
    source: &PermissionModel,
    destination: &PermissionModel,
    verbosity: Verbosity,
) -> Result<()> {
    writeln!(w, "---")?;
    writeln!(w, "Summary:")?;
    writeln!(w, "  Total changes: {}", report.total())?;

    let grants = report
        .records
        .iter()
        .filter(|r| r.kind == ChangeKind::Grant)
        .count();
    let revokes = report.total() - grants;
    if grants > 0 {
        writeln!(w, "  Grants: {}", grants)?;
    }
    if revokes > 0 {
        writeln!(w, "  Revokes: {}", revokes)?;
    }

    if verbosity == Verbosity::Verbose {
        writeln!(
            w,
            "  Keys: {} source, {} destination",
            source.key_count(),
            destination.key_count()
        )?;
        writeln!(
            w,
            "  Cylinders: {} source, {} destination",
            source.cylinder_count(),
            destination.cylinder_count()
        )?;
        writeln!(
            w,
            "  Permissions: {} source, {} destination",
            source.permission_count(),
            destination.permission_count()
        )?;
    }

    Ok(())
}

use lockdiff::{ChangeKind, CsvDialect, extract_matrix, read_table, try_diff_models};

fn usage() -> ! {
    eprintln!("Usage: basic_diff <CURRENT.csv> <PLANNED.csv> [N]");
    eprintln!("  N: optionally print only the first N changes");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let current_path = args.next().unwrap_or_else(|| usage());
    let planned_path = args.next().unwrap_or_else(|| usage());
    let show_n: Option<usize> = args.next().map(|s| s.parse()).transpose()?;

    let dialect = CsvDialect::default();
    let current = extract_matrix(&read_table(&std::fs::read(&current_path)?, &dialect)?)?;
    let planned = extract_matrix(&read_table(&std::fs::read(&planned_path)?, &dialect)?)?;

    let report = try_diff_models(&current, &planned)?;

    println!("keys: {} -> {}", current.key_count(), planned.key_count());
    println!(
        "cylinders: {} -> {}",
        current.cylinder_count(),
        planned.cylinder_count()
    );
    println!("changes: {}", report.records.len());

    let limit = show_n.unwrap_or(report.records.len());
    for record in report.records.iter().take(limit) {
        let verb = match record.kind {
            ChangeKind::Grant => "grant",
            ChangeKind::Revoke => "revoke",
        };
        println!(
            "{verb}: {} [{}] -> {} [{}]",
            record.key_title, record.key_id, record.cylinder_title, record.cylinder_id
        );
    }

    Ok(())
}

use lockdiff::{CsvDialect, JsonLinesSink, extract_matrix, read_table, try_diff_models_streaming};

fn usage() -> ! {
    eprintln!("Usage: streaming <CURRENT.csv> <PLANNED.csv> > out.jsonl");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let current_path = args.next().unwrap_or_else(|| usage());
    let planned_path = args.next().unwrap_or_else(|| usage());

    let dialect = CsvDialect::default();
    let current = extract_matrix(&read_table(&std::fs::read(&current_path)?, &dialect)?)?;
    let planned = extract_matrix(&read_table(&std::fs::read(&planned_path)?, &dialect)?)?;

    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut sink = JsonLinesSink::new(handle);

    let summary = try_diff_models_streaming(&current, &planned, &mut sink)?;

    eprintln!("changes={}", summary.change_count);

    Ok(())
}

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000_000 {
        return;
    }

    let dialect = lockdiff::CsvDialect::default();
    if let Ok(table) = lockdiff::read_table(data, &dialect) {
        let _ = lockdiff::extract_matrix(&table);
    }
});

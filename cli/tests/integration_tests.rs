use std::fs;
use std::path::Path;
use std::process::Command;

fn lockdiff_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lockdiff"))
}

/// Canonical matrix export: cylinder rows anchored in the first column, key
/// columns starting at the fifth, the key id four rows under the header.
const MATRIX_CURRENT: &str = ";;;;G1;G2
;;;;F1;F2
;;;;L1;L2

;;;;K1;K2
Haus A;C1;Tür 1;;X;
Haus A;C2;Tür 2;;;X
";

/// Same plan with K1's permission for C1 withdrawn.
const MATRIX_PLANNED: &str = ";;;;G1;G2
;;;;F1;F2
;;;;L1;L2

;;;;K1;K2
Haus A;C1;Tür 1;;;
Haus A;C2;Tür 2;;;X
";

const REVOKE_LINE: &str =
    "Key \"L1, F1 (G1)\" [K1] should no longer be permitted to open cylinder \"Tür 1\" [C1]";

fn write_export(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path.to_string_lossy().into_owned()
}

#[test]
fn identical_exports_exit_0() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "unchanged.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["diff", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert!(
        output.status.success(),
        "identical exports should exit 0: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No permission changes found."));
    assert!(stdout.contains("Total changes: 0"));
}

#[test]
fn changed_exports_exit_1_and_name_the_change() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "planned.csv", MATRIX_PLANNED);

    let output = lockdiff_cmd()
        .args(["diff", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(
        output.status.code(),
        Some(1),
        "changed exports should exit 1: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(REVOKE_LINE), "stdout: {stdout}");
    assert!(stdout.contains("Total changes: 1"));
    assert!(stdout.contains("Revokes: 1"));
}

#[test]
fn quiet_mode_prints_only_the_summary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "planned.csv", MATRIX_PLANNED);

    let output = lockdiff_cmd()
        .args(["diff", "--quiet", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("should no longer be permitted"));
    assert!(stdout.contains("Total changes: 1"));
}

#[test]
fn verbose_mode_adds_model_statistics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "planned.csv", MATRIX_PLANNED);

    let output = lockdiff_cmd()
        .args(["diff", "--verbose", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Keys: 2 source, 2 destination"), "{stdout}");
    assert!(stdout.contains("Cylinders: 2 source, 2 destination"));
}

#[test]
fn json_output_is_a_versioned_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "planned.csv", MATRIX_PLANNED);

    let output = lockdiff_cmd()
        .args(["diff", "--format", "json", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("output should be valid JSON");

    assert_eq!(parsed.get("version").and_then(|v| v.as_str()), Some("1"));
    let records = parsed
        .get("records")
        .and_then(|v| v.as_array())
        .expect("records array");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("kind").and_then(|v| v.as_str()),
        Some("revoke")
    );
    assert_eq!(
        records[0].get("key_id").and_then(|v| v.as_str()),
        Some("K1")
    );
}

#[test]
fn jsonl_streams_a_header_then_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "planned.csv", MATRIX_PLANNED);

    let output = lockdiff_cmd()
        .args(["diff", "--format", "jsonl", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(
        output.status.code(),
        Some(1),
        "jsonl diff should detect changes: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one record: {stdout}");

    let header: serde_json::Value =
        serde_json::from_str(lines[0]).expect("header line should be valid JSON");
    assert_eq!(header.get("kind").and_then(|v| v.as_str()), Some("Header"));
    assert_eq!(header.get("version").and_then(|v| v.as_str()), Some("1"));

    let record: serde_json::Value =
        serde_json::from_str(lines[1]).expect("record line should be valid JSON");
    assert_eq!(record.get("kind").and_then(|v| v.as_str()), Some("revoke"));
    assert_eq!(record.get("key_id").and_then(|v| v.as_str()), Some("K1"));
    assert_eq!(
        record.get("cylinder_id").and_then(|v| v.as_str()),
        Some("C1")
    );
}

#[test]
fn jsonl_without_changes_exits_0_with_only_the_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);
    let b = write_export(dir.path(), "unchanged.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["diff", "--format", "jsonl", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "only the header: {stdout}");
    let header: serde_json::Value = serde_json::from_str(lines[0]).expect("valid JSON");
    assert_eq!(header.get("kind").and_then(|v| v.as_str()), Some("Header"));
}

#[test]
fn nonexistent_input_exits_2() {
    let output = lockdiff_cmd()
        .args(["diff", "missing_a.csv", "missing_b.csv"])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(
        output.status.code(),
        Some(2),
        "nonexistent file should exit 2: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read export"), "{stderr}");
}

#[test]
fn malformed_csv_exits_2_with_the_error_code() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "broken.csv", "Haus A;C1;\"Tür");
    let b = write_export(dir.path(), "current.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["diff", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse CSV"), "{stderr}");
    assert!(stderr.contains("LKDIFF_CSV_002"), "{stderr}");
}

#[test]
fn zip_magic_routes_to_the_workbook_reader() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.xlsx");
    fs::write(&path, b"PK\x03\x04this is not a workbook").expect("write fixture");

    let output = lockdiff_cmd()
        .args(["info", &path.to_string_lossy()])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse workbook"), "{stderr}");
}

#[test]
fn separator_override_reads_comma_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(
        dir.path(),
        "current.csv",
        &MATRIX_CURRENT.replace(';', ","),
    );
    let b = write_export(
        dir.path(),
        "planned.csv",
        &MATRIX_PLANNED.replace(';', ","),
    );

    let output = lockdiff_cmd()
        .args(["diff", "--separator", ",", &a, &b])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(
        output.status.code(),
        Some(1),
        "comma dialect should parse: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(REVOKE_LINE), "{stdout}");
}

#[test]
fn a_separator_clashing_with_the_quote_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["diff", "--separator", "\"", &a, &a])
        .output()
        .expect("failed to run lockdiff");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LKDIFF_CSV_003"), "{stderr}");
}

#[test]
fn info_reports_layout_and_counts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["info", &a])
        .output()
        .expect("failed to run lockdiff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Export: current.csv"));
    assert!(stdout.contains("Layout: pivot matrix (CSV)"));
    assert!(stdout.contains("Keys: 2"));
    assert!(stdout.contains("Cylinders: 2"));
    assert!(stdout.contains("Permissions: 2"));
}

#[test]
fn verbose_info_lists_entities_with_titles() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = write_export(dir.path(), "current.csv", MATRIX_CURRENT);

    let output = lockdiff_cmd()
        .args(["info", "--verbose", &a])
        .output()
        .expect("failed to run lockdiff");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("\"L1, F1 (G1)\" [K1] opens 1 cylinders"),
        "{stdout}"
    );
    assert!(stdout.contains("\"Tür 1\" [C1]"), "{stdout}");
}

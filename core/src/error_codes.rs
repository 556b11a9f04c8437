//! Stable error codes for programmatic matching.
//!
//! Every core error exposes one of these codes through its `code()` method,
//! and user-actionable messages embed the code in brackets. Codes are
//! append-only: never renumber or reuse a retired code.

pub const MATRIX_MISSING_CYLINDER_ID: &str = "LKDIFF_MATRIX_001";
pub const MATRIX_MISSING_KEY_ID: &str = "LKDIFF_MATRIX_002";

pub const ROLES_MISSING_SHEET: &str = "LKDIFF_ROLES_001";
pub const ROLES_MISSING_HEADER_ROW: &str = "LKDIFF_ROLES_002";
pub const ROLES_MISSING_HEADER: &str = "LKDIFF_ROLES_003";
pub const ROLES_MISSING_ROLE: &str = "LKDIFF_ROLES_004";
pub const ROLES_UNKNOWN_KEY: &str = "LKDIFF_ROLES_005";
pub const ROLES_UNKNOWN_CYLINDER: &str = "LKDIFF_ROLES_006";

pub const CSV_DECODE: &str = "LKDIFF_CSV_001";
pub const CSV_UNCLOSED_QUOTE: &str = "LKDIFF_CSV_002";
pub const CSV_DIALECT: &str = "LKDIFF_CSV_003";

pub const CONTAINER_IO: &str = "LKDIFF_CONTAINER_001";
pub const CONTAINER_ZIP: &str = "LKDIFF_CONTAINER_002";
pub const CONTAINER_NOT_ZIP: &str = "LKDIFF_CONTAINER_003";
pub const CONTAINER_TOO_MANY_ENTRIES: &str = "LKDIFF_CONTAINER_004";
pub const CONTAINER_PART_TOO_LARGE: &str = "LKDIFF_CONTAINER_005";
pub const CONTAINER_TOTAL_TOO_LARGE: &str = "LKDIFF_CONTAINER_006";
pub const CONTAINER_NOT_OPC: &str = "LKDIFF_CONTAINER_007";

pub const XLSX_XML: &str = "LKDIFF_XLSX_001";
pub const XLSX_WORKBOOK_MISSING: &str = "LKDIFF_XLSX_002";
pub const XLSX_SHEET_PART_MISSING: &str = "LKDIFF_XLSX_003";
pub const XLSX_BAD_CELL_REFERENCE: &str = "LKDIFF_XLSX_004";
pub const XLSX_SHARED_STRING_RANGE: &str = "LKDIFF_XLSX_005";

pub const DIFF_SINK_ERROR: &str = "LKDIFF_DIFF_001";

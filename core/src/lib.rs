//! Lockdiff: A library for comparing locking-plan permissions.
//!
//! This crate provides functionality for:
//! - Reading locking-plan exports (pivot-matrix CSV and role workbooks)
//! - Extracting a canonical key/cylinder permission model from either layout
//! - Computing the granted and revoked pairs between two models
//! - Serializing change reports to JSON
//!
//! # Quick Start
//!
//! ```ignore
//! use lockdiff::CsvDialect;
//!
//! let current_bytes = std::fs::read("current.csv")?;
//! let current = lockdiff::extract_matrix(&lockdiff::read_table(
//!     &current_bytes,
//!     &CsvDialect::default(),
//! )?)?;
//!
//! let planned_file = std::fs::File::open("planned.xlsx")?;
//! let planned = lockdiff::extract_role_workbook(&lockdiff::read_workbook(planned_file)?)?;
//!
//! let report = lockdiff::diff_models(&current, &planned);
//! for record in &report.records {
//!     println!("{:?}", record);
//! }
//! ```

#[cfg(feature = "excel-open-xml")]
mod container;
mod csv_open;
mod diff;
mod engine;
pub mod error_codes;
#[cfg(feature = "excel-open-xml")]
mod excel_open_xml;
mod matrix;
mod model;
mod output;
mod roles;
mod sink;
mod table;

#[cfg(feature = "excel-open-xml")]
pub use container::{ContainerError, ContainerLimits, OpcContainer};
pub use csv_open::{CsvDialect, CsvReadError, decode_text, parse_csv, read_table};
pub use diff::{ChangeKind, ChangeRecord, DiffError, DiffReport, DiffSummary};
pub use engine::{diff_models, try_diff_models, try_diff_models_streaming};
#[cfg(feature = "excel-open-xml")]
pub use excel_open_xml::{ExcelOpenError, read_workbook, read_workbook_from_path};
pub use matrix::{MatrixParseError, extract_matrix};
pub use model::{Cylinder, Key, PermissionModel};
pub use output::json_lines::JsonLinesSink;
pub use roles::{RoleParseError, extract_role_workbook};
pub use sink::{CallbackSink, ChangeSink, VecSink};
pub use table::{CellValue, Sheet, Table, Workbook};

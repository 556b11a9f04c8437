//! Tabular source data structures.
//!
//! This module defines the intermediate representation every extractor
//! consumes:
//! - [`CellValue`]: An evaluated cell value (text, number, boolean, error)
//! - [`Table`]: A rectangular grid of trimmed, optional text cells
//! - [`Workbook`]: A collection of named [`Sheet`]s with case-insensitive lookup
//!
//! Readers (CSV, workbook XML) normalize raw cells into this shape before any
//! permission extraction runs: every stored value is trimmed and non-empty,
//! and a blank or absent cell reads back as `None`.

use serde::{Deserialize, Serialize};

/// An evaluated cell value as produced by a reader.
///
/// Formula cells surface as their cached evaluation result, never as formula
/// text. Date cells surface through their numeric serial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// An error literal such as `#DIV/0!` or `#N/A`.
    Error(String),
}

impl CellValue {
    /// Renders the value the way the locking-system exports display it:
    /// integral numbers without a fractional part, booleans uppercased,
    /// error literals verbatim.
    pub fn to_display_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// A rectangular grid of optional text cells.
///
/// # Invariants
///
/// Every stored `Some` value is trimmed and non-empty. Rows may be ragged;
/// reads outside any row's materialized width are blank, never a panic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Builds a table from raw text rows, trimming each cell and mapping
    /// blank cells to `None`.
    pub fn from_text_rows<R, C>(rows: R) -> Table
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| normalize_cell(&cell)).collect())
            .collect();
        Table { rows }
    }

    /// Builds a table from evaluated cell rows, rendering each value to
    /// display text before normalizing.
    pub fn from_cell_rows<R, C>(rows: R) -> Table
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<CellValue>>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.and_then(|v| normalize_cell(&v.to_display_text())))
                    .collect()
            })
            .collect();
        Table { rows }
    }

    /// The cell at `(row, col)`, or `None` when out of range or blank.
    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|cell| cell.as_deref())
    }

    /// Number of materialized rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest materialized row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Materialized width of a single row, 0 when the row does not exist.
    pub fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }

    /// Index of the first row containing any non-blank cell.
    pub fn first_non_blank_row(&self) -> Option<usize> {
        (0..self.height()).find(|&row| !self.is_blank_row(row))
    }

    /// True when no cell in `row` holds a value.
    pub fn is_blank_row(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(cells) => cells.iter().all(Option::is_none),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Option::is_none))
    }
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A workbook containing one or more named sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// A single named sheet within a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// The display name of the sheet (e.g., "Transponder").
    pub name: String,
    /// The sheet's normalized cell data.
    pub table: Table,
}

impl Workbook {
    /// Looks up a sheet by name, ignoring ASCII case.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

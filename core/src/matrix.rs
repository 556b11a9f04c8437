//! Pivot-matrix permission extraction.
//!
//! The matrix export is a headerless grid: cylinders occupy a block of rows,
//! keys occupy a block of columns, and a non-blank cell at the intersection
//! of a cylinder row and a key column means "this key opens this cylinder".
//! Nothing in the file labels either block, so the layout is located by
//! position heuristics:
//!
//! - the first column with any value anchors the cylinder block; cylinder
//!   rows run from the first populated row in that column to the bottom
//! - the first non-blank row is the key header; key columns run from its
//!   first populated cell to its end
//!
//! Field offsets within each block are fixed by the export format (see the
//! `CYLINDER_*`/`KEY_*` constants).

use crate::error_codes;
use crate::model::{Cylinder, Key, PermissionModel};
use crate::table::Table;
use thiserror::Error;

/// Column offset from the anchor column to the cylinder id (required).
const CYLINDER_ID_OFFSET: usize = 1;
/// Column offset from the anchor column to the cylinder name.
const CYLINDER_NAME_OFFSET: usize = 2;

/// Row offset from the header row to the key group.
const KEY_GROUP_OFFSET: usize = 0;
/// Row offset from the header row to the key first name.
const KEY_FIRST_NAME_OFFSET: usize = 1;
/// Row offset from the header row to the key last name.
const KEY_LAST_NAME_OFFSET: usize = 2;
/// Row offset from the header row to the key id (required). Offset 3 is
/// reserved in the export format and intentionally skipped.
const KEY_ID_OFFSET: usize = 4;

/// Errors produced while locating the matrix layout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatrixParseError {
    #[error(
        "[LKDIFF_MATRIX_001] cylinder row {row} has no id in column {column}. Suggestion: check that the export kept the id column directly right of the first populated column."
    )]
    MissingCylinderId { row: usize, column: usize },

    #[error(
        "[LKDIFF_MATRIX_002] key column {column} has no id in row {row}. Suggestion: check that the export kept the id row four rows below the key header row."
    )]
    MissingKeyId { column: usize, row: usize },
}

impl MatrixParseError {
    pub fn code(&self) -> &'static str {
        match self {
            MatrixParseError::MissingCylinderId { .. } => error_codes::MATRIX_MISSING_CYLINDER_ID,
            MatrixParseError::MissingKeyId { .. } => error_codes::MATRIX_MISSING_KEY_ID,
        }
    }
}

/// Extracts a permission model from a pivot-matrix grid.
///
/// An entirely blank table yields an empty model. A cylinder row or key
/// column missing its required id aborts extraction.
pub fn extract_matrix(table: &Table) -> Result<PermissionModel, MatrixParseError> {
    let Some(anchor_col) = first_non_blank_column(table) else {
        return Ok(PermissionModel::default());
    };

    let Some(first_cylinder_row) =
        (0..table.height()).find(|&row| table.value(row, anchor_col).is_some())
    else {
        return Ok(PermissionModel::default());
    };

    let mut cylinders = Vec::new();
    for row in first_cylinder_row..table.height() {
        let id_col = anchor_col + CYLINDER_ID_OFFSET;
        let id = table
            .value(row, id_col)
            .ok_or(MatrixParseError::MissingCylinderId { row, column: id_col })?;
        let name = table
            .value(row, anchor_col + CYLINDER_NAME_OFFSET)
            .unwrap_or("");
        cylinders.push(Cylinder::new(id, name));
    }

    let mut keys = Vec::new();
    let mut permissions = Vec::new();

    if let Some(header_row) = table.first_non_blank_row() {
        let header_width = table.row_width(header_row);
        let first_key_col = (0..header_width).find(|&col| table.value(header_row, col).is_some());

        if let Some(first_key_col) = first_key_col {
            for col in first_key_col..header_width {
                let id_row = header_row + KEY_ID_OFFSET;
                let id = table
                    .value(id_row, col)
                    .ok_or(MatrixParseError::MissingKeyId { column: col, row: id_row })?;

                let key = Key {
                    group: field(table, header_row + KEY_GROUP_OFFSET, col),
                    first_name: field(table, header_row + KEY_FIRST_NAME_OFFSET, col),
                    last_name: field(table, header_row + KEY_LAST_NAME_OFFSET, col),
                    ..Key::new(id)
                };

                let permitted: Vec<String> = (first_cylinder_row..table.height())
                    .filter(|&row| table.value(row, col).is_some())
                    .map(|row| cylinders[row - first_cylinder_row].id.clone())
                    .collect();

                permissions.push((key.id.clone(), permitted));
                keys.push(key);
            }
        }
    }

    Ok(PermissionModel::new(keys, cylinders, permissions))
}

/// First column index holding a value in any row, scanning columns
/// left-to-right and bounded by the widest materialized row.
fn first_non_blank_column(table: &Table) -> Option<usize> {
    let height = table.height();
    (0..table.width()).find(|&col| (0..height).any(|row| table.value(row, col).is_some()))
}

fn field(table: &Table, row: usize, col: usize) -> Option<String> {
    table.value(row, col).map(str::to_string)
}

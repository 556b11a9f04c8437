//! Role-based workbook permission extraction.
//!
//! The normalized export spreads the locking plan over four sheets: the
//! cylinder and key registers plus two assignment sheets that connect keys
//! to roles and roles to cylinders. Permissions are resolved by walking that
//! indirection: a key may open every cylinder reachable through any of its
//! roles.
//!
//! Sheet and header names come from the locking-system vendor and are
//! matched ignoring ASCII case; the `ignorieren` status marker is compared
//! exactly.

use crate::error_codes;
use crate::model::{Cylinder, Key, PermissionModel};
use crate::table::{Table, Workbook};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Range;
use thiserror::Error;

const SHEET_CYLINDERS: &str = "Schließzylinder";
const SHEET_KEYS: &str = "Transponder";
const SHEET_KEY_ROLES: &str = "Transponder-Berechtigungen";
const SHEET_ROLE_PERMISSIONS: &str = "Rollen-Berechtigungen";

const HEADER_ID: &str = "ID";
const HEADER_NAME: &str = "Name";
const HEADER_SECTION: &str = "Bereich";
const HEADER_BUILDING: &str = "Haus";
const HEADER_STATUS: &str = "Status";
const HEADER_LAST_NAME: &str = "Nachname";
const HEADER_FIRST_NAME: &str = "Vorname";
const HEADER_KEY_REF: &str = "Transponder";
const HEADER_ROLE: &str = "Rolle";
const HEADER_CYLINDER_REF: &str = "Schließzylinder";

/// Status value that excludes an entity from diff consideration.
const IGNORE_MARKER: &str = "ignorieren";

/// Errors produced while reading the four-sheet workbook layout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoleParseError {
    #[error(
        "[LKDIFF_ROLES_001] required sheet '{sheet}' not found. Suggestion: export all four locking-plan sheets into one workbook."
    )]
    MissingSheet { sheet: String },

    #[error(
        "[LKDIFF_ROLES_002] sheet '{sheet}' has no header row. Suggestion: the first populated row must name the columns."
    )]
    MissingHeaderRow { sheet: String },

    #[error(
        "[LKDIFF_ROLES_003] sheet '{sheet}' is missing required column '{header}'. Suggestion: header lookup ignores case but the label itself must match."
    )]
    MissingHeader { sheet: String, header: String },

    #[error(
        "[LKDIFF_ROLES_004] sheet '{sheet}' row {row} names no role. Suggestion: every populated row needs a value in the '{HEADER_ROLE}' column."
    )]
    MissingRole { sheet: String, row: usize },

    #[error(
        "[LKDIFF_ROLES_005] row {row} references key '{id}', which the '{SHEET_KEYS}' sheet does not define. Suggestion: export all sheets from the same database snapshot."
    )]
    UnknownKey { id: String, row: usize },

    #[error(
        "[LKDIFF_ROLES_006] row {row} references cylinder '{id}', which the '{SHEET_CYLINDERS}' sheet does not define. Suggestion: export all sheets from the same database snapshot."
    )]
    UnknownCylinder { id: String, row: usize },
}

impl RoleParseError {
    pub fn code(&self) -> &'static str {
        match self {
            RoleParseError::MissingSheet { .. } => error_codes::ROLES_MISSING_SHEET,
            RoleParseError::MissingHeaderRow { .. } => error_codes::ROLES_MISSING_HEADER_ROW,
            RoleParseError::MissingHeader { .. } => error_codes::ROLES_MISSING_HEADER,
            RoleParseError::MissingRole { .. } => error_codes::ROLES_MISSING_ROLE,
            RoleParseError::UnknownKey { .. } => error_codes::ROLES_UNKNOWN_KEY,
            RoleParseError::UnknownCylinder { .. } => error_codes::ROLES_UNKNOWN_CYLINDER,
        }
    }
}

/// Extracts a permission model from the four-sheet role workbook.
///
/// Missing sheets, missing required headers, and dangling cross-sheet
/// references abort extraction; rows with a blank identifying value are
/// skipped silently.
pub fn extract_role_workbook(workbook: &Workbook) -> Result<PermissionModel, RoleParseError> {
    let cylinders = parse_cylinders(&SheetFrame::locate(workbook, SHEET_CYLINDERS)?)?;
    let keys = parse_keys(&SheetFrame::locate(workbook, SHEET_KEYS)?)?;

    let key_ids: FxHashSet<&str> = keys.iter().map(|k| k.id.as_str()).collect();
    let cylinder_ids: FxHashSet<&str> = cylinders.iter().map(|c| c.id.as_str()).collect();

    let assignments =
        parse_key_roles(&SheetFrame::locate(workbook, SHEET_KEY_ROLES)?, &key_ids)?;
    let role_permissions = parse_role_permissions(
        &SheetFrame::locate(workbook, SHEET_ROLE_PERMISSIONS)?,
        &cylinder_ids,
    )?;

    let permissions = resolve_permissions(&keys, &cylinders, &assignments, &role_permissions);

    Ok(PermissionModel::new(keys, cylinders, permissions))
}

/// A located sheet with its header row and data range.
struct SheetFrame<'a> {
    name: &'static str,
    table: &'a Table,
    header_row: usize,
}

impl<'a> SheetFrame<'a> {
    fn locate(workbook: &'a Workbook, name: &'static str) -> Result<SheetFrame<'a>, RoleParseError> {
        let sheet = workbook
            .sheet(name)
            .ok_or_else(|| RoleParseError::MissingSheet {
                sheet: name.to_string(),
            })?;
        let header_row =
            sheet
                .table
                .first_non_blank_row()
                .ok_or_else(|| RoleParseError::MissingHeaderRow {
                    sheet: name.to_string(),
                })?;
        Ok(SheetFrame {
            name,
            table: &sheet.table,
            header_row,
        })
    }

    /// Header lookup, ignoring ASCII case.
    fn find_column(&self, header: &str) -> Option<usize> {
        (0..self.table.row_width(self.header_row)).find(|&col| {
            self.table
                .value(self.header_row, col)
                .is_some_and(|v| v.eq_ignore_ascii_case(header))
        })
    }

    fn require_column(&self, header: &str) -> Result<usize, RoleParseError> {
        self.find_column(header)
            .ok_or_else(|| RoleParseError::MissingHeader {
                sheet: self.name.to_string(),
                header: header.to_string(),
            })
    }

    fn data_rows(&self) -> Range<usize> {
        (self.header_row + 1)..self.table.height()
    }

    /// Reads a cell through an optional column lookup.
    fn value(&self, row: usize, col: Option<usize>) -> Option<&str> {
        col.and_then(|c| self.table.value(row, c))
    }
}

fn parse_cylinders(frame: &SheetFrame) -> Result<Vec<Cylinder>, RoleParseError> {
    let id_col = frame.require_column(HEADER_ID)?;
    let name_col = frame.find_column(HEADER_NAME);
    let section_col = frame.find_column(HEADER_SECTION);
    let building_col = frame.find_column(HEADER_BUILDING);
    let status_col = frame.find_column(HEADER_STATUS);

    let mut cylinders = Vec::new();
    for row in frame.data_rows() {
        let Some(id) = frame.table.value(row, id_col) else {
            continue;
        };
        cylinders.push(Cylinder {
            section: frame.value(row, section_col).map(str::to_string),
            building: frame.value(row, building_col).map(str::to_string),
            ignore: frame.value(row, status_col) == Some(IGNORE_MARKER),
            ..Cylinder::new(id, frame.value(row, name_col).unwrap_or(""))
        });
    }
    Ok(cylinders)
}

fn parse_keys(frame: &SheetFrame) -> Result<Vec<Key>, RoleParseError> {
    let id_col = frame.require_column(HEADER_ID)?;
    let name_col = frame.find_column(HEADER_NAME);
    let last_name_col = frame.find_column(HEADER_LAST_NAME);
    let first_name_col = frame.find_column(HEADER_FIRST_NAME);
    let status_col = frame.find_column(HEADER_STATUS);

    let mut keys = Vec::new();
    for row in frame.data_rows() {
        let Some(id) = frame.table.value(row, id_col) else {
            continue;
        };
        keys.push(Key {
            name: frame.value(row, name_col).map(str::to_string),
            last_name: frame.value(row, last_name_col).map(str::to_string),
            first_name: frame.value(row, first_name_col).map(str::to_string),
            ignore: frame.value(row, status_col) == Some(IGNORE_MARKER),
            ..Key::new(id)
        });
    }
    Ok(keys)
}

/// Key id to assigned role names.
fn parse_key_roles(
    frame: &SheetFrame,
    known_keys: &FxHashSet<&str>,
) -> Result<FxHashMap<String, FxHashSet<String>>, RoleParseError> {
    let key_col = frame.require_column(HEADER_KEY_REF)?;
    let role_col = frame.require_column(HEADER_ROLE)?;

    let mut assignments: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    for row in frame.data_rows() {
        let Some(key_id) = frame.table.value(row, key_col) else {
            continue;
        };
        if !known_keys.contains(key_id) {
            return Err(RoleParseError::UnknownKey {
                id: key_id.to_string(),
                row,
            });
        }
        let Some(role) = frame.table.value(row, role_col) else {
            return Err(RoleParseError::MissingRole {
                sheet: frame.name.to_string(),
                row,
            });
        };
        assignments
            .entry(key_id.to_string())
            .or_default()
            .insert(role.to_string());
    }
    Ok(assignments)
}

/// Role name to the cylinder ids it permits.
fn parse_role_permissions(
    frame: &SheetFrame,
    known_cylinders: &FxHashSet<&str>,
) -> Result<FxHashMap<String, FxHashSet<String>>, RoleParseError> {
    let role_col = frame.require_column(HEADER_ROLE)?;
    let cylinder_col = frame.require_column(HEADER_CYLINDER_REF)?;

    let mut role_permissions: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    for row in frame.data_rows() {
        let Some(cylinder_id) = frame.table.value(row, cylinder_col) else {
            continue;
        };
        if !known_cylinders.contains(cylinder_id) {
            return Err(RoleParseError::UnknownCylinder {
                id: cylinder_id.to_string(),
                row,
            });
        }
        let Some(role) = frame.table.value(row, role_col) else {
            return Err(RoleParseError::MissingRole {
                sheet: frame.name.to_string(),
                row,
            });
        };
        role_permissions
            .entry(role.to_string())
            .or_default()
            .insert(cylinder_id.to_string());
    }
    Ok(role_permissions)
}

/// Unions each key's reachable cylinders over its roles, then intersects
/// with the cylinder register so the result keeps the register's insertion
/// order. Roles without any permission entry contribute nothing; keys that
/// resolve to nothing are omitted.
fn resolve_permissions(
    keys: &[Key],
    cylinders: &[Cylinder],
    assignments: &FxHashMap<String, FxHashSet<String>>,
    role_permissions: &FxHashMap<String, FxHashSet<String>>,
) -> Vec<(String, Vec<String>)> {
    let mut permissions = Vec::new();

    for key in keys {
        let Some(roles) = assignments.get(&key.id) else {
            continue;
        };

        let mut reachable: FxHashSet<&str> = FxHashSet::default();
        for role in roles {
            if let Some(cylinder_ids) = role_permissions.get(role) {
                reachable.extend(cylinder_ids.iter().map(String::as_str));
            }
        }

        let permitted: Vec<String> = cylinders
            .iter()
            .filter(|c| reachable.contains(c.id.as_str()))
            .map(|c| c.id.clone())
            .collect();

        if !permitted.is_empty() {
            permissions.push((key.id.clone(), permitted));
        }
    }

    permissions
}

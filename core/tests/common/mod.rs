//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use lockdiff::{Cylinder, Key, PermissionModel, Sheet, Table, Workbook};

pub fn text_table(rows: &[&[&str]]) -> Table {
    Table::from_text_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()),
    )
}

pub fn workbook(sheets: &[(&str, &[&[&str]])]) -> Workbook {
    Workbook {
        sheets: sheets
            .iter()
            .map(|(name, rows)| Sheet {
                name: name.to_string(),
                table: text_table(rows),
            })
            .collect(),
    }
}

pub fn key(id: &str) -> Key {
    Key::new(id)
}

pub fn named_key(id: &str, name: &str) -> Key {
    Key {
        name: Some(name.to_string()),
        ..Key::new(id)
    }
}

pub fn ignored_key(id: &str) -> Key {
    Key {
        ignore: true,
        ..Key::new(id)
    }
}

pub fn cylinder(id: &str, name: &str) -> Cylinder {
    Cylinder::new(id, name)
}

pub fn ignored_cylinder(id: &str, name: &str) -> Cylinder {
    Cylinder {
        ignore: true,
        ..Cylinder::new(id, name)
    }
}

pub fn model(
    keys: Vec<Key>,
    cylinders: Vec<Cylinder>,
    permissions: Vec<(&str, Vec<&str>)>,
) -> PermissionModel {
    PermissionModel::new(
        keys,
        cylinders,
        permissions.into_iter().map(|(key_id, cylinder_ids)| {
            (
                key_id.to_string(),
                cylinder_ids.into_iter().map(str::to_string).collect(),
            )
        }),
    )
}

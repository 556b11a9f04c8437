use anyhow::{Context, Result};
use lockdiff::{CsvDialect, PermissionModel};
use std::fs;
use std::io::Cursor;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// The two export layouts the tool accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SourceKind {
    MatrixCsv,
    RoleWorkbook,
}

/// Picks the layout from the file's leading bytes, not its extension:
/// workbook packages are ZIP archives, everything else is treated as CSV.
pub(crate) fn detect_kind(bytes: &[u8]) -> SourceKind {
    if bytes.len() >= 4 && bytes[..4] == ZIP_MAGIC {
        SourceKind::RoleWorkbook
    } else {
        SourceKind::MatrixCsv
    }
}

pub(crate) struct LoadedModel {
    pub kind: SourceKind,
    pub model: PermissionModel,
}

/// Reads an export file and extracts its permission model.
pub(crate) fn load_model(path: &str, dialect: &CsvDialect) -> Result<LoadedModel> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read export: {}", path))?;
    let kind = detect_kind(&bytes);

    let model = match kind {
        SourceKind::RoleWorkbook => {
            let workbook = lockdiff::read_workbook(Cursor::new(bytes))
                .with_context(|| format!("Failed to parse workbook: {}", path))?;
            lockdiff::extract_role_workbook(&workbook)
                .with_context(|| format!("Failed to extract permissions from workbook: {}", path))?
        }
        SourceKind::MatrixCsv => {
            let table = lockdiff::read_table(&bytes, dialect)
                .with_context(|| format!("Failed to parse CSV: {}", path))?;
            lockdiff::extract_matrix(&table)
                .with_context(|| format!("Failed to extract permissions from matrix: {}", path))?
        }
    };

    Ok(LoadedModel { kind, model })
}

/// Applies the `--separator` override onto the default dialect.
pub(crate) fn build_dialect(separator: Option<char>) -> Result<CsvDialect> {
    let mut dialect = CsvDialect::default();
    if let Some(sep) = separator {
        dialect.separator = sep;
    }
    dialect.validate()?;
    Ok(dialect)
}

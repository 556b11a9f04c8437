//! CSV reading for matrix exports.
//!
//! The locking-system vendor writes CSV as UTF-16LE without a byte order
//! mark, with `;` separators and `"` quoting. This module detects the
//! encoding (BOM first, then a zero-second-byte probe), parses the dialect,
//! and hands back a [`Table`].

use crate::error_codes;
use crate::table::Table;
use thiserror::Error;

/// Errors produced while decoding or parsing CSV input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CsvReadError {
    #[error(
        "[LKDIFF_CSV_001] text decoding failed: {reason}. Suggestion: export the plan as UTF-8 or UTF-16 CSV."
    )]
    Decode { reason: String },

    #[error(
        "[LKDIFF_CSV_002] quoted field is still open at end of input. Suggestion: check that the export was not truncated."
    )]
    UnclosedQuote,

    #[error(
        "[LKDIFF_CSV_003] separator and quote must be different characters (both are {character:?}). Suggestion: pick a distinct quote character."
    )]
    InvalidDialect { character: char },
}

impl CsvReadError {
    pub fn code(&self) -> &'static str {
        match self {
            CsvReadError::Decode { .. } => error_codes::CSV_DECODE,
            CsvReadError::UnclosedQuote => error_codes::CSV_UNCLOSED_QUOTE,
            CsvReadError::InvalidDialect { .. } => error_codes::CSV_DIALECT,
        }
    }
}

/// Separator and quote characters for one CSV flavor.
///
/// The default matches the vendor export dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub separator: char,
    pub quote: char,
}

impl Default for CsvDialect {
    fn default() -> CsvDialect {
        CsvDialect {
            separator: ';',
            quote: '"',
        }
    }
}

impl CsvDialect {
    pub fn validate(&self) -> Result<(), CsvReadError> {
        if self.separator == self.quote {
            return Err(CsvReadError::InvalidDialect {
                character: self.separator,
            });
        }
        Ok(())
    }
}

/// Decodes raw CSV bytes into text.
///
/// BOMs for UTF-8, UTF-16LE, and UTF-16BE are honored and stripped. Without
/// a BOM, a zero in the second byte selects UTF-16LE; any leading ASCII
/// character puts one there in the vendor's export. Everything else is read
/// as UTF-8. Decoding is strict and never substitutes replacement
/// characters.
pub fn decode_text(bytes: &[u8]) -> Result<String, CsvReadError> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return decode_utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if bytes.len() >= 2 && bytes[1] == 0 {
        return decode_utf16(bytes, u16::from_le_bytes);
    }
    decode_utf8(bytes)
}

fn decode_utf8(bytes: &[u8]) -> Result<String, CsvReadError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| CsvReadError::Decode {
        reason: e.to_string(),
    })
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String, CsvReadError> {
    if bytes.len() % 2 != 0 {
        return Err(CsvReadError::Decode {
            reason: format!("UTF-16 input has odd length {}", bytes.len()),
        });
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| combine([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| CsvReadError::Decode {
        reason: e.to_string(),
    })
}

/// Parses CSV text into rows of fields.
///
/// A quote toggles quoted mode wherever it appears; inside a quoted section
/// separators and newlines are literal and a doubled quote emits one quote
/// character. Rows end at LF, CR, or CRLF. Empty input yields no rows, and
/// a trailing newline does not add one.
pub fn parse_csv(text: &str, dialect: &CsvDialect) -> Result<Vec<Vec<String>>, CsvReadError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == dialect.quote {
                if chars.peek() == Some(&dialect.quote) {
                    chars.next();
                    field.push(dialect.quote);
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        if ch == dialect.quote {
            in_quotes = true;
        } else if ch == dialect.separator {
            row.push(std::mem::take(&mut field));
        } else if ch == '\r' || ch == '\n' {
            if ch == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            row.push(std::mem::take(&mut field));
            rows.push(std::mem::take(&mut row));
        } else {
            field.push(ch);
        }
    }

    if in_quotes {
        return Err(CsvReadError::UnclosedQuote);
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

/// Decodes and parses CSV bytes into a [`Table`].
pub fn read_table(bytes: &[u8], dialect: &CsvDialect) -> Result<Table, CsvReadError> {
    dialect.validate()?;
    let text = decode_text(bytes)?;
    let rows = parse_csv(&text, dialect)?;
    Ok(Table::from_text_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Vec<String>> {
        parse_csv(text, &CsvDialect::default()).unwrap()
    }

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn decodes_utf16le_without_bom() {
        let bytes = utf16le("ID;Name\nK1;Tür");
        assert_eq!(decode_text(&bytes).unwrap(), "ID;Name\nK1;Tür");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("a;b".as_bytes());
        assert_eq!(decode_text(&bytes).unwrap(), "a;b");
    }

    #[test]
    fn strips_utf16_boms() {
        let mut le = vec![0xFF, 0xFE];
        le.extend(utf16le("x"));
        assert_eq!(decode_text(&le).unwrap(), "x");

        let mut be = vec![0xFE, 0xFF];
        be.extend("x".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode_text(&be).unwrap(), "x");
    }

    #[test]
    fn plain_ascii_reads_as_utf8() {
        assert_eq!(decode_text(b"ab;cd").unwrap(), "ab;cd");
    }

    #[test]
    fn odd_length_utf16_is_an_error() {
        let mut bytes = utf16le("ab");
        bytes.pop();
        let err = decode_text(&bytes).unwrap_err();
        assert_eq!(err.code(), "LKDIFF_CSV_001");
    }

    #[test]
    fn splits_fields_and_rows() {
        assert_eq!(
            parse("a;b\nc;d"),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ]
        );
    }

    #[test]
    fn empty_fields_survive() {
        assert_eq!(parse("a;;b"), vec![vec!["a".to_string(), String::new(), "b".to_string()]]);
    }

    #[test]
    fn quoted_fields_keep_separators_and_newlines() {
        assert_eq!(
            parse("\"a;b\";\"line1\nline2\""),
            vec![vec!["a;b".to_string(), "line1\nline2".to_string()]]
        );
    }

    #[test]
    fn doubled_quote_is_a_literal_quote() {
        assert_eq!(
            parse("\"He said \"\"hi\"\"\""),
            vec![vec!["He said \"hi\"".to_string()]]
        );
    }

    #[test]
    fn crlf_and_bare_cr_end_rows() {
        assert_eq!(
            parse("a\r\nb\rc"),
            vec![
                vec!["a".to_string()],
                vec!["b".to_string()],
                vec!["c".to_string()],
            ]
        );
    }

    #[test]
    fn trailing_newline_adds_no_row() {
        assert_eq!(parse("a\n"), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = parse_csv("\"open", &CsvDialect::default()).unwrap_err();
        assert_eq!(err.code(), "LKDIFF_CSV_002");
    }

    #[test]
    fn dialect_rejects_matching_separator_and_quote() {
        let dialect = CsvDialect {
            separator: '"',
            quote: '"',
        };
        let err = dialect.validate().unwrap_err();
        assert_eq!(err.code(), "LKDIFF_CSV_003");
    }

    #[test]
    fn read_table_decodes_and_trims() {
        let bytes = utf16le("ID;Name\nK1;  Tür  \n");
        let table = read_table(&bytes, &CsvDialect::default()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.value(1, 0), Some("K1"));
        assert_eq!(table.value(1, 1), Some("Tür"));
    }
}

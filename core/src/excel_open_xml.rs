//! Workbook file parsing.
//!
//! Opens `.xlsx` packages and parses their worksheet XML into [`Workbook`]
//! tables. Only cached cell values are read: formula text is consumed and
//! discarded, so a formula cell surfaces as its last evaluated result.

use crate::container::{ContainerError, OpcContainer};
use crate::error_codes;
use crate::table::{CellValue, Sheet, Table, Workbook};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read as IoRead, Seek};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExcelOpenError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("workbook.xml missing or unreadable")]
    WorkbookXmlMissing,
    #[error("worksheet XML missing for sheet {sheet_name}")]
    WorksheetXmlMissing { sheet_name: String },
    #[error("invalid cell address: {0}")]
    BadCellReference(String),
    #[error("shared string index {0} out of bounds")]
    SharedStringOutOfBounds(usize),
}

impl ExcelOpenError {
    pub fn code(&self) -> &'static str {
        match self {
            ExcelOpenError::Container(e) => e.code(),
            ExcelOpenError::Xml(_) => error_codes::XLSX_XML,
            ExcelOpenError::WorkbookXmlMissing => error_codes::XLSX_WORKBOOK_MISSING,
            ExcelOpenError::WorksheetXmlMissing { .. } => error_codes::XLSX_SHEET_PART_MISSING,
            ExcelOpenError::BadCellReference(_) => error_codes::XLSX_BAD_CELL_REFERENCE,
            ExcelOpenError::SharedStringOutOfBounds(_) => error_codes::XLSX_SHARED_STRING_RANGE,
        }
    }
}

/// Reads a workbook from any seekable byte source.
pub fn read_workbook<R: IoRead + Seek + 'static>(reader: R) -> Result<Workbook, ExcelOpenError> {
    let mut container = OpcContainer::open_from_reader(reader)?;
    read_workbook_from_container(&mut container)
}

pub fn read_workbook_from_path(path: impl AsRef<Path>) -> Result<Workbook, ExcelOpenError> {
    let mut container = OpcContainer::open_from_path(path.as_ref())?;
    read_workbook_from_container(&mut container)
}

fn read_workbook_from_container(
    container: &mut OpcContainer,
) -> Result<Workbook, ExcelOpenError> {
    let shared_strings = match container.read_file_optional("xl/sharedStrings.xml")? {
        Some(bytes) => parse_shared_strings(&bytes)?,
        None => Vec::new(),
    };

    let workbook_bytes = container
        .read_file("xl/workbook.xml")
        .map_err(|_| ExcelOpenError::WorkbookXmlMissing)?;

    let descriptors = parse_workbook_xml(&workbook_bytes)?;

    let relationships = match container.read_file_optional("xl/_rels/workbook.xml.rels")? {
        Some(bytes) => parse_relationships(&bytes)?,
        None => HashMap::new(),
    };

    let mut sheets = Vec::with_capacity(descriptors.len());
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let target = resolve_sheet_target(descriptor, &relationships, idx);
        let sheet_bytes =
            container
                .read_file(&target)
                .map_err(|_| ExcelOpenError::WorksheetXmlMissing {
                    sheet_name: descriptor.name.clone(),
                })?;
        let table = parse_sheet_xml(&sheet_bytes, &shared_strings)?;
        sheets.push(Sheet {
            name: descriptor.name.clone(),
            table,
        });
    }

    Ok(Workbook { sheets })
}

struct SheetDescriptor {
    name: String,
    rel_id: Option<String>,
    sheet_id: Option<u32>,
}

/// Parses `xl/sharedStrings.xml`, flattening rich-text runs into one string
/// per entry.
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, ExcelOpenError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" && in_si => {
                let text = reader.read_text(e.name()).map_err(to_xml_err)?.into_owned();
                current.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"si" => {
                strings.push(current.clone());
                in_si = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

fn parse_workbook_xml(xml: &[u8]) -> Result<Vec<SheetDescriptor>, ExcelOpenError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                let mut sheet_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| ExcelOpenError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"name" => {
                            name = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"sheetId" => {
                            let parsed = attr.unescape_value().map_err(to_xml_err)?;
                            sheet_id = parsed.into_owned().parse::<u32>().ok();
                        }
                        b"r:id" => {
                            rel_id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    sheets.push(SheetDescriptor {
                        name,
                        rel_id,
                        sheet_id,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, ExcelOpenError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut map = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| ExcelOpenError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned()),
                        b"Target" => {
                            target = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"Type" => {
                            rel_type = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type)
                    && rel_type.contains("worksheet")
                {
                    map.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

fn resolve_sheet_target(
    sheet: &SheetDescriptor,
    relationships: &HashMap<String, String>,
    index: usize,
) -> String {
    if let Some(rel_id) = &sheet.rel_id
        && let Some(target) = relationships.get(rel_id)
    {
        return normalize_target(target);
    }

    let guessed = sheet
        .sheet_id
        .map(|id| format!("xl/worksheets/sheet{id}.xml"))
        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
    normalize_target(&guessed)
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

fn parse_sheet_xml(xml: &[u8], shared_strings: &[String]) -> Result<Table, ExcelOpenError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut rows: Vec<Vec<Option<CellValue>>> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let cell = parse_cell(&mut reader, e, shared_strings)?;
                let (row, col) = (cell.row as usize, cell.col as usize);
                if rows.len() <= row {
                    rows.resize_with(row + 1, Vec::new);
                }
                if rows[row].len() <= col {
                    rows[row].resize(col + 1, None);
                }
                rows[row][col] = cell.value;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(Table::from_cell_rows(rows))
}

struct ParsedCell {
    row: u32,
    col: u32,
    value: Option<CellValue>,
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: BytesStart,
    shared_strings: &[String],
) -> Result<ParsedCell, ExcelOpenError> {
    let address_raw = get_attr_value(&start, b"r")?
        .ok_or_else(|| ExcelOpenError::Xml("cell missing address".into()))?;
    let (row, col) = address_to_index(&address_raw)
        .ok_or_else(|| ExcelOpenError::BadCellReference(address_raw.clone()))?;

    let cell_type = get_attr_value(&start, b"t")?;

    let mut value_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => {
                let text = reader.read_text(e.name()).map_err(to_xml_err)?.into_owned();
                value_text = Some(text);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"f" => {
                // Drain the formula so the reader stays positioned; only the
                // cached value matters here.
                reader.read_text(e.name()).map_err(to_xml_err)?;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"is" => {
                inline_text = Some(read_inline_string(reader)?);
            }
            Ok(Event::End(e)) if e.name().as_ref() == start.name().as_ref() => break,
            Ok(Event::Eof) => {
                return Err(ExcelOpenError::Xml("unexpected EOF inside cell".into()));
            }
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    let value = match inline_text {
        Some(text) => Some(CellValue::Text(text)),
        None => convert_value(value_text.as_deref(), cell_type.as_deref(), shared_strings)?,
    };

    Ok(ParsedCell { row, col, value })
}

fn read_inline_string(reader: &mut Reader<&[u8]>) -> Result<String, ExcelOpenError> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => {
                let text = reader.read_text(e.name()).map_err(to_xml_err)?.into_owned();
                value.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"is" => break,
            Ok(Event::Eof) => {
                return Err(ExcelOpenError::Xml(
                    "unexpected EOF inside inline string".into(),
                ));
            }
            Err(e) => return Err(to_xml_err(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn convert_value(
    value_text: Option<&str>,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<Option<CellValue>, ExcelOpenError> {
    let raw = match value_text {
        Some(t) => t,
        None => return Ok(None),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match cell_type {
        Some("s") => {
            let idx = trimmed
                .parse::<usize>()
                .map_err(|e| ExcelOpenError::Xml(e.to_string()))?;
            let text = shared_strings
                .get(idx)
                .ok_or(ExcelOpenError::SharedStringOutOfBounds(idx))?;
            Ok(Some(CellValue::Text(text.clone())))
        }
        Some("b") => Ok(match trimmed {
            "1" => Some(CellValue::Bool(true)),
            "0" => Some(CellValue::Bool(false)),
            _ => None,
        }),
        Some("e") => Ok(Some(CellValue::Error(trimmed.to_string()))),
        Some("str") | Some("inlineStr") => Ok(Some(CellValue::Text(raw.to_string()))),
        _ => {
            if let Ok(n) = trimmed.parse::<f64>() {
                Ok(Some(CellValue::Number(n)))
            } else {
                Ok(Some(CellValue::Text(trimmed.to_string())))
            }
        }
    }
}

/// Parses an A1 address into zero-based (row, col) indices.
fn address_to_index(a1: &str) -> Option<(u32, u32)> {
    if a1.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_letter = false;
    let mut saw_digit = false;

    for ch in a1.chars() {
        if ch.is_ascii_alphabetic() {
            saw_letter = true;
            if saw_digit {
                // Letters after digits are not allowed.
                return None;
            }
            let upper = ch.to_ascii_uppercase() as u8;
            col = col
                .checked_mul(26)?
                .checked_add((upper - b'A' + 1) as u32)?;
        } else if ch.is_ascii_digit() {
            saw_digit = true;
            row = row.checked_mul(10)?.checked_add((ch as u8 - b'0') as u32)?;
        } else {
            return None;
        }
    }

    if !saw_letter || !saw_digit || row == 0 || col == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

fn get_attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ExcelOpenError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ExcelOpenError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(
                attr.unescape_value().map_err(to_xml_err)?.into_owned(),
            ));
        }
    }
    Ok(None)
}

fn to_xml_err(err: impl std::fmt::Display) -> ExcelOpenError {
    ExcelOpenError::Xml(err.to_string())
}

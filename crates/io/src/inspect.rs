// Read finished workbooks back: cell text via calamine, table and column
// parts straight from the package XML.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::error::{xml_error, Error, Result};

/// Cell text of one worksheet, rows and columns from A1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// One `xl/tables/tableN.xml` part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TablePart {
    pub part: String,
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub reference: String,
    pub auto_filter: Option<String>,
    pub style: Option<String>,
    pub row_stripes: bool,
    pub columns: Vec<(u32, String)>,
}

/// One `<col>` entry of a worksheet, width in characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub min: u32,
    pub max: u32,
    pub width: f64,
}

pub fn read_sheets(bytes: &[u8]) -> Result<Vec<SheetGrid>> {
    let mut workbook: Xlsx<Cursor<&[u8]>> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| Error::Read(e.to_string()))?;

    let mut grids = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::Read(format!("sheet '{}': {}", name, e)))?;

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col as usize];
            cells.extend(row.iter().map(|cell| cell.to_string()));
            rows.push(cells);
        }
        grids.push(SheetGrid { name, rows });
    }
    Ok(grids)
}

/// Every table part in the package, ordered by part number.
pub fn read_tables(bytes: &[u8]) -> Result<Vec<TablePart>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/tables/") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    parts.sort_by_key(|p| part_number(p));

    let mut tables = Vec::with_capacity(parts.len());
    for part in parts {
        let xml = read_zip_file(&mut archive, &part)?;
        let mut table = parse_table_part(&xml)?;
        table.part = part;
        tables.push(table);
    }
    Ok(tables)
}

/// `<cols>` of `xl/worksheets/sheet{sheet_number}.xml`.
pub fn read_column_widths(bytes: &[u8], sheet_number: usize) -> Result<Vec<ColumnWidth>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_zip_file(&mut archive, &format!("xl/worksheets/sheet{sheet_number}.xml"))?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut widths = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"col" => {
                let attrs = collect_attrs(e)?;
                let number = |key: &str| attrs.get(key).and_then(|v| v.parse::<u32>().ok());
                if let (Some(min), Some(max), Some(width)) = (
                    number("min"),
                    number("max"),
                    attrs.get("width").and_then(|v| v.parse::<f64>().ok()),
                ) {
                    widths.push(ColumnWidth { min, max, width });
                }
            }
            // <cols> precedes <sheetData>; nothing more to find
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"sheetData" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(widths)
}

fn parse_table_part(xml: &str) -> Result<TablePart> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut table = TablePart::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let mut attrs = collect_attrs(e)?;
                let mut take = |key: &str| attrs.remove(key).unwrap_or_default();
                match e.name().as_ref() {
                    b"table" => {
                        table.id = take("id").parse().unwrap_or(0);
                        table.name = take("name");
                        table.display_name = take("displayName");
                        table.reference = take("ref");
                    }
                    b"autoFilter" => table.auto_filter = Some(take("ref")),
                    b"tableColumn" => {
                        let id = take("id").parse().unwrap_or(0);
                        table.columns.push((id, take("name")));
                    }
                    b"tableStyleInfo" => {
                        table.style = Some(take("name"));
                        table.row_stripes = take("showRowStripes") == "1";
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(table)
}

/// Collect XML attributes, values unescaped.
fn collect_attrs(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw).map_err(xml_error)?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Read a file from a ZIP archive.
fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive.by_name(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

// "xl/tables/table12.xml" -> 12
fn part_number(part: &str) -> u32 {
    part.trim_end_matches(".xml")
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .chars()
        .rev()
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

// Low-level SpreadsheetML package writer
//
// Builds the workbook part by part (content types, relationships, workbook,
// styles, shared strings, worksheets, tables) and zips them into an .xlsx.
// Cells hold text only; every cell is written through the shared-string table.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{xml_error, Error, Result};
use crate::layout::{fit_units, units_to_chars, DEFAULT_COLUMN_UNITS, MAX_COLUMN_UNITS};
use crate::region::{AreaRef, CellRef, RegionError, TableRegion, MAX_COL, MAX_ROW};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
const REL_TABLE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";

const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_XML: &str = "application/xml";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
const CT_TABLE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml";

/// Excel sheet name maximum length.
pub const MAX_SHEET_NAME_LEN: usize = 31;
const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

// Single default font/fill/border/xf; every cell uses style 0.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>
"#;

/// One worksheet: sparse text cells, column widths and table regions.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, BTreeMap<u16, String>>,
    widths: BTreeMap<u16, u32>,
    tables: Vec<TableRegion>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: BTreeMap::new(),
            widths: BTreeMap::new(),
            tables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_cell_text(&mut self, row: u32, col: u16, text: impl Into<String>) -> Result<()> {
        if row > MAX_ROW || col > MAX_COL {
            return Err(RegionError::OutOfBounds {
                row: row as u64,
                col: col as u64,
            }
            .into());
        }
        self.rows.entry(row).or_default().insert(col, text.into());
        Ok(())
    }

    pub fn cell_text(&self, row: u32, col: u16) -> Option<&str> {
        self.rows.get(&row)?.get(&col).map(String::as_str)
    }

    /// Number of rows holding at least one cell.
    pub fn populated_rows(&self) -> usize {
        self.rows.len()
    }

    /// Smallest area covering every populated cell.
    pub fn dimension(&self) -> Option<AreaRef> {
        let first_row = *self.rows.keys().next()?;
        let last_row = *self.rows.keys().next_back()?;
        let first_col = self.rows.values().filter_map(|r| r.keys().next()).min()?;
        let last_col = self.rows.values().filter_map(|r| r.keys().next_back()).max()?;
        Some(AreaRef {
            first: CellRef { row: first_row, col: *first_col },
            last: CellRef { row: last_row, col: *last_col },
        })
    }

    pub fn tables(&self) -> &[TableRegion] {
        &self.tables
    }

    /// Current width in 1/256 character units.
    pub fn column_width(&self, col: u16) -> u32 {
        self.widths.get(&col).copied().unwrap_or(DEFAULT_COLUMN_UNITS)
    }

    pub fn set_column_width(&mut self, col: u16, units: u32) -> Result<()> {
        if units > MAX_COLUMN_UNITS {
            return Err(Error::ColumnWidth(units));
        }
        self.widths.insert(col, units);
        Ok(())
    }

    /// Fit the column to its widest cell. Empty columns keep their width.
    pub fn auto_size_column(&mut self, col: u16) {
        let texts = self.rows.values().filter_map(|cells| cells.get(&col)).map(String::as_str);
        if let Some(units) = fit_units(texts) {
            self.widths.insert(col, units);
        }
    }
}

/// In-memory workbook package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    sheets: Vec<Sheet>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet and return its index.
    pub fn create_sheet(&mut self, name: &str) -> Result<usize> {
        validate_sheet_name(name)?;
        let lower = name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lower) {
            return Err(Error::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Sheet::new(name));
        log::debug!("created sheet '{}' at index {}", name, self.sheets.len() - 1);
        Ok(self.sheets.len() - 1)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Result<&Sheet> {
        self.sheets.get(index).ok_or(Error::UnknownSheet(index))
    }

    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        self.sheets.get_mut(index).ok_or(Error::UnknownSheet(index))
    }

    /// Attach a table to a sheet. Table ids and names are unique per workbook.
    pub fn add_table(&mut self, sheet_index: usize, region: TableRegion) -> Result<()> {
        let name = region.name().to_lowercase();
        for existing in self.sheets.iter().flat_map(|s| s.tables.iter()) {
            if existing.id() == region.id() {
                return Err(Error::DuplicateTable {
                    kind: "id",
                    value: region.id().to_string(),
                });
            }
            if existing.name().to_lowercase() == name {
                return Err(Error::DuplicateTable {
                    kind: "name",
                    value: region.name().to_string(),
                });
            }
        }
        let sheet = self.sheet_mut(sheet_index)?;
        log::debug!(
            "table {} ({}) on sheet '{}' over {}",
            region.id(),
            region.name(),
            sheet.name,
            region.area()
        );
        sheet.tables.push(region);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    /// Zip every part into `writer` and hand it back.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        if self.sheets.is_empty() {
            return Err(Error::EmptyWorkbook);
        }

        // fixed timestamps keep the output byte-for-byte reproducible
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut zip = ZipWriter::new(writer);
        let strings = SharedStrings::collect(&self.sheets);

        put_part(&mut zip, options, "[Content_Types].xml", &self.content_types_xml()?)?;
        put_part(&mut zip, options, "_rels/.rels", &root_rels_xml()?)?;
        put_part(&mut zip, options, "xl/workbook.xml", &self.workbook_xml()?)?;
        put_part(&mut zip, options, "xl/_rels/workbook.xml.rels", &self.workbook_rels_xml()?)?;
        put_part(&mut zip, options, "xl/styles.xml", STYLES_XML.as_bytes())?;
        put_part(&mut zip, options, "xl/sharedStrings.xml", &strings.to_xml()?)?;

        let mut table_part = 0usize;
        for (index, sheet) in self.sheets.iter().enumerate() {
            let sheet_number = index + 1;
            put_part(
                &mut zip,
                options,
                &format!("xl/worksheets/sheet{sheet_number}.xml"),
                &worksheet_xml(sheet, &strings)?,
            )?;

            if sheet.tables.is_empty() {
                continue;
            }
            put_part(
                &mut zip,
                options,
                &format!("xl/worksheets/_rels/sheet{sheet_number}.xml.rels"),
                &sheet_rels_xml(table_part + 1, sheet.tables.len())?,
            )?;
            for region in &sheet.tables {
                table_part += 1;
                put_part(
                    &mut zip,
                    options,
                    &format!("xl/tables/table{table_part}.xml"),
                    &table_xml(region)?,
                )?;
            }
        }

        Ok(zip.finish()?)
    }

    fn table_count(&self) -> usize {
        self.sheets.iter().map(|s| s.tables.len()).sum()
    }

    fn content_types_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlPart::new()?;
        xml.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
        xml.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
        xml.empty("Default", &[("Extension", "xml"), ("ContentType", CT_XML)])?;
        xml.empty("Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)])?;
        for index in 1..=self.sheets.len() {
            let part = format!("/xl/worksheets/sheet{index}.xml");
            xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_WORKSHEET)])?;
        }
        for index in 1..=self.table_count() {
            let part = format!("/xl/tables/table{index}.xml");
            xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_TABLE)])?;
        }
        xml.empty("Override", &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)])?;
        xml.empty(
            "Override",
            &[("PartName", "/xl/sharedStrings.xml"), ("ContentType", CT_SHARED_STRINGS)],
        )?;
        xml.end("Types")?;
        Ok(xml.finish())
    }

    fn workbook_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlPart::new()?;
        xml.start("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
        xml.start("sheets", &[])?;
        for (index, sheet) in self.sheets.iter().enumerate() {
            let sheet_id = (index + 1).to_string();
            let rel_id = format!("rId{}", index + 1);
            xml.empty(
                "sheet",
                &[
                    ("name", sheet.name.as_str()),
                    ("sheetId", sheet_id.as_str()),
                    ("r:id", rel_id.as_str()),
                ],
            )?;
        }
        xml.end("sheets")?;
        xml.end("workbook")?;
        Ok(xml.finish())
    }

    // Worksheets take rId1..rIdN, styles and shared strings follow.
    fn workbook_rels_xml(&self) -> Result<Vec<u8>> {
        let n = self.sheets.len();
        let mut xml = XmlPart::new()?;
        xml.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
        for index in 1..=n {
            let id = format!("rId{index}");
            let target = format!("worksheets/sheet{index}.xml");
            relationship(&mut xml, &id, REL_WORKSHEET, &target)?;
        }
        relationship(&mut xml, &format!("rId{}", n + 1), REL_STYLES, "styles.xml")?;
        relationship(&mut xml, &format!("rId{}", n + 2), REL_SHARED_STRINGS, "sharedStrings.xml")?;
        xml.end("Relationships")?;
        Ok(xml.finish())
    }
}

/// Reject names Excel refuses to open.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        Some("name is longer than 31 characters")
    } else if name.contains(SHEET_NAME_ILLEGAL) {
        Some("name contains one of * : ? / \\ [ ]")
    } else if name.starts_with('\'') || name.ends_with('\'') {
        Some("name begins or ends with an apostrophe")
    } else if name.eq_ignore_ascii_case("History") {
        Some("name is reserved")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(Error::SheetName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Workbook-wide shared-string table in first-use order.
struct SharedStrings<'a> {
    index: HashMap<&'a str, usize>,
    ordered: Vec<&'a str>,
    count: usize,
}

impl<'a> SharedStrings<'a> {
    fn collect(sheets: &'a [Sheet]) -> Self {
        let mut strings = Self {
            index: HashMap::new(),
            ordered: Vec::new(),
            count: 0,
        };
        for text in sheets.iter().flat_map(|s| s.rows.values()).flat_map(|r| r.values()) {
            strings.count += 1;
            if !strings.index.contains_key(text.as_str()) {
                strings.index.insert(text.as_str(), strings.ordered.len());
                strings.ordered.push(text.as_str());
            }
        }
        strings
    }

    fn index_of(&self, text: &str) -> usize {
        // every cell text was registered by collect()
        self.index.get(text).copied().unwrap_or_default()
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        let count = self.count.to_string();
        let unique = self.ordered.len().to_string();
        let mut xml = XmlPart::new()?;
        xml.start(
            "sst",
            &[("xmlns", NS_MAIN), ("count", count.as_str()), ("uniqueCount", unique.as_str())],
        )?;
        for text in &self.ordered {
            xml.start("si", &[])?;
            if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                xml.start("t", &[("xml:space", "preserve")])?;
            } else {
                xml.start("t", &[])?;
            }
            xml.text(&escape_cell_text(text))?;
            xml.end("t")?;
            xml.end("si")?;
        }
        xml.end("sst")?;
        Ok(xml.finish())
    }
}

fn worksheet_xml(sheet: &Sheet, strings: &SharedStrings<'_>) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;

    let dimension = sheet
        .dimension()
        .map(|area| area.to_string())
        .unwrap_or_else(|| "A1".to_string());
    xml.empty("dimension", &[("ref", dimension.as_str())])?;

    if !sheet.widths.is_empty() {
        xml.start("cols", &[])?;
        for (col, units) in &sheet.widths {
            let position = (*col as u32 + 1).to_string();
            let width = units_to_chars(*units).to_string();
            xml.empty(
                "col",
                &[
                    ("min", position.as_str()),
                    ("max", position.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        xml.end("cols")?;
    }

    if sheet.rows.is_empty() {
        xml.empty("sheetData", &[])?;
    } else {
        xml.start("sheetData", &[])?;
        for (row, cells) in &sheet.rows {
            let row_number = (row + 1).to_string();
            xml.start("row", &[("r", row_number.as_str())])?;
            for (col, text) in cells {
                let cell_ref = CellRef { row: *row, col: *col }.to_string();
                let string_index = strings.index_of(text).to_string();
                xml.start("c", &[("r", cell_ref.as_str()), ("t", "s")])?;
                xml.start("v", &[])?;
                xml.text(&string_index)?;
                xml.end("v")?;
                xml.end("c")?;
            }
            xml.end("row")?;
        }
        xml.end("sheetData")?;
    }

    if !sheet.tables.is_empty() {
        let count = sheet.tables.len().to_string();
        xml.start("tableParts", &[("count", count.as_str())])?;
        for index in 1..=sheet.tables.len() {
            let rel_id = format!("rId{index}");
            xml.empty("tablePart", &[("r:id", rel_id.as_str())])?;
        }
        xml.end("tableParts")?;
    }

    xml.end("worksheet")?;
    Ok(xml.finish())
}

fn sheet_rels_xml(first_table_part: usize, table_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
    for offset in 0..table_count {
        let id = format!("rId{}", offset + 1);
        let target = format!("../tables/table{}.xml", first_table_part + offset);
        relationship(&mut xml, &id, REL_TABLE, &target)?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn table_xml(region: &TableRegion) -> Result<Vec<u8>> {
    let id = region.id().to_string();
    let area = region.area().to_string();
    let filter = region.auto_filter().to_string();
    let column_count = region.columns().len().to_string();
    let stripes = if region.style().show_row_stripes { "1" } else { "0" };

    let mut xml = XmlPart::new()?;
    xml.start(
        "table",
        &[
            ("xmlns", NS_MAIN),
            ("id", id.as_str()),
            ("name", region.name()),
            ("displayName", region.display_name()),
            ("ref", area.as_str()),
            ("totalsRowShown", "0"),
        ],
    )?;
    xml.empty("autoFilter", &[("ref", filter.as_str())])?;
    xml.start("tableColumns", &[("count", column_count.as_str())])?;
    for column in region.columns() {
        let column_id = column.id.to_string();
        xml.empty("tableColumn", &[("id", column_id.as_str()), ("name", column.name.as_str())])?;
    }
    xml.end("tableColumns")?;
    xml.empty(
        "tableStyleInfo",
        &[
            ("name", region.style().name.as_str()),
            ("showFirstColumn", "0"),
            ("showLastColumn", "0"),
            ("showRowStripes", stripes),
            ("showColumnStripes", "0"),
        ],
    )?;
    xml.end("table")?;
    Ok(xml.finish())
}

fn root_rels_xml() -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
    relationship(&mut xml, "rId1", REL_OFFICE_DOCUMENT, "xl/workbook.xml")?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn relationship(xml: &mut XmlPart, id: &str, kind: &str, target: &str) -> Result<()> {
    xml.empty("Relationship", &[("Id", id), ("Type", kind), ("Target", target)])
}

fn put_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    name: &str,
    bytes: &[u8],
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(bytes)?;
    Ok(())
}

/// XML 1.0 cannot carry most control characters, and readers turn a bare CR
/// into LF. Excel spells both as `_xHHHH_`, so text that already looks like
/// `_xHHHH_` gets its underscore written as `_x005F_`.
fn escape_cell_text(text: &str) -> std::borrow::Cow<'_, str> {
    let needs_escape = |c: char| c.is_control() && !matches!(c, '\t' | '\n');
    if !text.chars().any(needs_escape) && !text.contains("_x") {
        return std::borrow::Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        if needs_escape(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
            continue;
        }
        if c == '_' && starts_with_escape(&text[i..]) {
            out.push_str("_x005F");
        }
        out.push(c);
    }
    std::borrow::Cow::Owned(out)
}

fn starts_with_escape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 7
        && bytes.starts_with(b"_x")
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// Thin event writer for one package part.
struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(element)).map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(element)).map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

// Workbook writers on rust_xlsxwriter

use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook, Worksheet};
use xlbench_table::{DataTable, Record, Value};

use crate::error::{Error, Result};
use crate::layout::{fit_units, units_to_chars, DEFAULT_COLUMN_UNITS, MAX_COLUMN_UNITS};
use crate::ooxml::validate_sheet_name;
use crate::region::{parse_table_style, CellRef, StyleFamily, TableRegion};
use crate::sheet::{sheet_name_for, table_area, table_id_for, SheetReport, WriteOptions};

/// Header row from the field names, then one typed row per record.
pub fn write_records_flat<'a, R, I>(records: I, sheet_name: &str) -> Result<Vec<u8>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    validate_sheet_name(sheet_name)?;
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, field) in R::FIELDS.iter().enumerate() {
        let cell = CellRef::new(0, col)?;
        worksheet.write_string(cell.row, cell.col, field.name)?;
    }

    let mut rows = 0usize;
    for (row, record) in records.into_iter().enumerate() {
        for (col, field) in R::FIELDS.iter().enumerate() {
            let cell = CellRef::new(row + 1, col)?;
            write_value(worksheet, cell, &field.value_of(record))?;
        }
        rows = row + 1;
    }

    log::debug!("xlsxwriter flat sheet '{}': {} rows", sheet_name, rows);
    Ok(workbook.save_to_buffer()?)
}

fn write_value(worksheet: &mut Worksheet, cell: CellRef, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Text(s) => {
            worksheet.write_string(cell.row, cell.col, s)?;
        }
        Value::Integer(n) => {
            worksheet.write_number(cell.row, cell.col, *n as f64)?;
        }
        Value::Float(n) => {
            worksheet.write_number(cell.row, cell.col, *n)?;
        }
        Value::Boolean(b) => {
            worksheet.write_boolean(cell.row, cell.col, *b)?;
        }
    }
    Ok(())
}

/// rust_xlsxwriter workbook that counts the native tables added to it.
///
/// rust_xlsxwriter assigns table ids itself, 1, 2, 3... in sheet order, with
/// no way to pick one. Table sheets therefore go in through
/// [`create_sheet_from_table`] by ascending index, and the count tells which
/// index comes next.
pub struct TableWorkbook {
    workbook: Workbook,
    tables: usize,
}

impl TableWorkbook {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            tables: 0,
        }
    }

    /// Native tables added so far; also the index the next table sheet must use.
    pub fn table_count(&self) -> usize {
        self.tables
    }

    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }
}

impl Default for TableWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Table-formatted sheet through rust_xlsxwriter's native table object.
///
/// Same layout and decoration as [`crate::sheet::create_sheet_from_table`]:
/// text cells, `Table{index + 1}` over the header and data rows, the
/// configured style, and columns fitted to content plus the filter padding.
/// `index` must equal [`TableWorkbook::table_count`], otherwise the id
/// rust_xlsxwriter writes would not match the name.
pub fn create_sheet_from_table(
    book: &mut TableWorkbook,
    index: usize,
    table: &DataTable,
    options: &WriteOptions,
) -> Result<SheetReport> {
    if index != book.tables {
        return Err(Error::TableOrder {
            index,
            next: book.tables,
        });
    }
    let sheet_name = sheet_name_for(table, index);
    validate_sheet_name(&sheet_name)?;

    let worksheet = book.workbook.add_worksheet();
    worksheet.set_name(&sheet_name)?;

    // Widths are tracked here; rust_xlsxwriter does not expose them back.
    let mut fitted: Vec<Option<u32>> = Vec::with_capacity(table.column_count());
    for (col, column) in table.columns().iter().enumerate() {
        let cell = CellRef::new(0, col)?;
        worksheet.write_string(cell.row, cell.col, &column.name)?;
        fitted.push(fit_units([column.name.as_str()]));
    }
    for (row, values) in table.rows().iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let cell = CellRef::new(row + 1, col)?;
            let text = value.to_string();
            if let Some(units) = fit_units([text.as_str()]) {
                let widest = fitted[col].map_or(units, |w| w.max(units));
                fitted[col] = Some(widest);
            }
            worksheet.write_string(cell.row, cell.col, &text)?;
        }
    }

    let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    let region = TableRegion::new(table_id_for(index)?, table_area(table)?, &names)?
        .with_style(&options.table_style, options.row_stripes)?;

    let columns: Vec<TableColumn> = names.iter().map(|name| TableColumn::new().set_header(*name)).collect();
    let xlsx_table = Table::new()
        .set_name(region.name())
        .set_style(table_style(&options.table_style))
        .set_banded_rows(options.row_stripes)
        .set_autofilter(true)
        .set_columns(&columns);
    let area = region.area();
    worksheet.add_table(area.first.row, area.first.col, area.last.row, area.last.col, &xlsx_table)?;
    book.tables += 1;
    // the id rust_xlsxwriter gives this table when the workbook is saved
    let written_id = table_id_for(book.tables - 1)?;

    let mut column_widths = Vec::with_capacity(fitted.len());
    for (col, fit) in fitted.iter().enumerate() {
        let col = CellRef::new(0, col)?.col;
        let width = fit
            .unwrap_or(DEFAULT_COLUMN_UNITS)
            .saturating_add(options.filter_button_padding)
            .min(MAX_COLUMN_UNITS);
        worksheet.set_column_width(col, units_to_chars(width))?;
        column_widths.push(width);
    }

    log::debug!(
        "xlsxwriter sheet '{}': {} data rows, table {} over {}",
        sheet_name,
        table.row_count(),
        region.name(),
        area
    );
    Ok(SheetReport {
        sheet_index: index,
        sheet_name,
        data_rows: table.row_count(),
        table_id: written_id,
        table_name: region.name().to_string(),
        table_ref: area.to_string(),
        column_widths,
    })
}

/// Map a validated built-in style name onto rust_xlsxwriter's enum.
fn table_style(name: &str) -> TableStyle {
    let Some((family, n)) = parse_table_style(name) else {
        return TableStyle::Medium2;
    };
    let styles: Vec<TableStyle> = match family {
        StyleFamily::Light => vec![
            TableStyle::Light1,
            TableStyle::Light2,
            TableStyle::Light3,
            TableStyle::Light4,
            TableStyle::Light5,
            TableStyle::Light6,
            TableStyle::Light7,
            TableStyle::Light8,
            TableStyle::Light9,
            TableStyle::Light10,
            TableStyle::Light11,
            TableStyle::Light12,
            TableStyle::Light13,
            TableStyle::Light14,
            TableStyle::Light15,
            TableStyle::Light16,
            TableStyle::Light17,
            TableStyle::Light18,
            TableStyle::Light19,
            TableStyle::Light20,
            TableStyle::Light21,
        ],
        StyleFamily::Medium => vec![
            TableStyle::Medium1,
            TableStyle::Medium2,
            TableStyle::Medium3,
            TableStyle::Medium4,
            TableStyle::Medium5,
            TableStyle::Medium6,
            TableStyle::Medium7,
            TableStyle::Medium8,
            TableStyle::Medium9,
            TableStyle::Medium10,
            TableStyle::Medium11,
            TableStyle::Medium12,
            TableStyle::Medium13,
            TableStyle::Medium14,
            TableStyle::Medium15,
            TableStyle::Medium16,
            TableStyle::Medium17,
            TableStyle::Medium18,
            TableStyle::Medium19,
            TableStyle::Medium20,
            TableStyle::Medium21,
            TableStyle::Medium22,
            TableStyle::Medium23,
            TableStyle::Medium24,
            TableStyle::Medium25,
            TableStyle::Medium26,
            TableStyle::Medium27,
            TableStyle::Medium28,
        ],
        StyleFamily::Dark => vec![
            TableStyle::Dark1,
            TableStyle::Dark2,
            TableStyle::Dark3,
            TableStyle::Dark4,
            TableStyle::Dark5,
            TableStyle::Dark6,
            TableStyle::Dark7,
            TableStyle::Dark8,
            TableStyle::Dark9,
            TableStyle::Dark10,
            TableStyle::Dark11,
        ],
    };
    styles
        .into_iter()
        .nth(usize::from(n) - 1)
        .unwrap_or(TableStyle::Medium2)
}

/// One-sheet workbook holding `table` as a native table, as bytes.
pub fn write_table_workbook(table: &DataTable, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut book = TableWorkbook::new();
    create_sheet_from_table(&mut book, 0, table, options)?;
    book.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::region::RegionError;
    use xlbench_table::project;

    xlbench_table::record! {
        struct Pair {
            name: String,
            value: Option<i64>,
        }
    }

    fn pairs() -> Vec<Pair> {
        vec![
            Pair { name: "A".into(), value: Some(1) },
            Pair { name: "B".into(), value: None },
            Pair { name: "C".into(), value: Some(3) },
        ]
    }

    #[test]
    fn test_flat_writer_produces_zip() {
        let bytes = write_records_flat(&pairs(), "export").unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_flat_writer_rejects_bad_sheet_name() {
        assert!(matches!(
            write_records_flat(&pairs(), "a[b]"),
            Err(Error::SheetName { .. })
        ));
    }

    #[test]
    fn test_table_report_matches_low_level_writer() {
        let table = project(&pairs());
        let mut book = TableWorkbook::new();
        let report = create_sheet_from_table(&mut book, 0, &table, &WriteOptions::default()).unwrap();
        assert_eq!(report.sheet_name, "Pair");
        assert_eq!(report.table_name, "Table1");
        assert_eq!(report.table_ref, "A1:B4");

        let mut package = crate::ooxml::Package::new();
        let low_level =
            crate::sheet::create_sheet_from_table(&mut package, 0, &table, &WriteOptions::default()).unwrap();
        assert_eq!(report.column_widths, low_level.column_widths);
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = project(&Vec::<Pair>::new());
        let err = write_table_workbook(&table, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Region(RegionError::NoDataRows)));
    }

    #[test]
    fn test_style_mapping() {
        // TableStyle has no Debug impl
        assert!(table_style("TableStyleLight9") == TableStyle::Light9);
        assert!(table_style("TableStyleMedium28") == TableStyle::Medium28);
        assert!(table_style("TableStyleDark1") == TableStyle::Dark1);
        assert!(table_style("bogus") == TableStyle::Medium2);
    }

    #[test]
    fn test_table_sheets_must_come_in_order() {
        let table = project(&pairs());
        let mut book = TableWorkbook::new();
        let err = create_sheet_from_table(&mut book, 4, &table, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, Error::TableOrder { index: 4, next: 0 }));
        assert_eq!(book.table_count(), 0);

        for index in 0..3 {
            let report = create_sheet_from_table(&mut book, index, &table, &WriteOptions::default()).unwrap();
            assert_eq!(report.table_id as usize, index + 1);
            assert_eq!(report.table_name, format!("Table{}", index + 1));
        }
        assert_eq!(book.table_count(), 3);

        let err = create_sheet_from_table(&mut book, 1, &table, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, Error::TableOrder { index: 1, next: 3 }));
    }

    #[test]
    fn test_rejected_region_does_not_count() {
        let mut book = TableWorkbook::new();
        let empty = project(&Vec::<Pair>::new());
        assert!(create_sheet_from_table(&mut book, 0, &empty, &WriteOptions::default()).is_err());
        assert_eq!(book.table_count(), 0);
    }
}

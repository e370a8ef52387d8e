// Table-formatted sheet writer over the low-level package

use xlbench_table::DataTable;

use crate::error::Result;
use crate::layout::{DEFAULT_FILTER_BUTTON_PADDING, MAX_COLUMN_UNITS};
use crate::ooxml::Package;
use crate::region::{AreaRef, CellRef, RegionError, TableRegion, DEFAULT_TABLE_STYLE};

/// How a projected table is decorated once its data is on the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub table_style: String,
    pub row_stripes: bool,
    /// Extra width per column for the auto-filter button, in 1/256 characters.
    pub filter_button_padding: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            table_style: DEFAULT_TABLE_STYLE.to_string(),
            row_stripes: true,
            filter_button_padding: DEFAULT_FILTER_BUTTON_PADDING,
        }
    }
}

/// What one call to a table writer produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetReport {
    pub sheet_index: usize,
    pub sheet_name: String,
    pub data_rows: usize,
    pub table_id: u32,
    pub table_name: String,
    pub table_ref: String,
    /// Final column widths, 1/256 character units.
    pub column_widths: Vec<u32>,
}

/// Sheet name for the table at `index`: its own name, else `Sheet {index}`.
pub fn sheet_name_for(table: &DataTable, index: usize) -> String {
    match table.name() {
        Some(name) => name.to_string(),
        None => format!("Sheet {index}"),
    }
}

/// Table id for the sheet at `index`; ids start at 1.
pub(crate) fn table_id_for(index: usize) -> std::result::Result<u32, RegionError> {
    u32::try_from(index)
        .ok()
        .and_then(|i| i.checked_add(1))
        .ok_or(RegionError::ZeroId)
}

/// Area covering the header row and every data row of `table`.
pub(crate) fn table_area(table: &DataTable) -> std::result::Result<AreaRef, RegionError> {
    let last_col = table.column_count().checked_sub(1).ok_or(RegionError::NoColumns)?;
    AreaRef::new(CellRef::new(0, 0)?, CellRef::new(table.row_count(), last_col)?)
}

/// Write `table` to a new sheet of `package` and format it as an Excel table.
///
/// The header row and the data rows (every value as its display text) are
/// emitted first. The table region is validated afterwards, so a rejected
/// region (no columns, no data rows) leaves the header on the sheet.
pub fn create_sheet_from_table(
    package: &mut Package,
    index: usize,
    table: &DataTable,
    options: &WriteOptions,
) -> Result<SheetReport> {
    let sheet_name = sheet_name_for(table, index);
    let sheet_index = package.create_sheet(&sheet_name)?;

    let sheet = package.sheet_mut(sheet_index)?;
    for (col, column) in table.columns().iter().enumerate() {
        let cell = CellRef::new(0, col)?;
        sheet.set_cell_text(cell.row, cell.col, column.name.as_str())?;
    }
    for (row, values) in table.rows().iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let cell = CellRef::new(row + 1, col)?;
            sheet.set_cell_text(cell.row, cell.col, value.to_string())?;
        }
    }

    let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    let region = TableRegion::new(table_id_for(index)?, table_area(table)?, &names)?
        .with_style(&options.table_style, options.row_stripes)?;
    let report_base = (region.id(), region.name().to_string(), region.area().to_string());
    package.add_table(sheet_index, region)?;

    let sheet = package.sheet_mut(sheet_index)?;
    let mut column_widths = Vec::with_capacity(names.len());
    for col in 0..names.len() {
        let col = CellRef::new(0, col)?.col;
        sheet.auto_size_column(col);
        let width = sheet
            .column_width(col)
            .saturating_add(options.filter_button_padding)
            .min(MAX_COLUMN_UNITS);
        sheet.set_column_width(col, width)?;
        column_widths.push(width);
    }

    let (table_id, table_name, table_ref) = report_base;
    log::debug!(
        "sheet '{}': {} data rows, table {} over {}",
        sheet_name,
        table.row_count(),
        table_name,
        table_ref
    );
    Ok(SheetReport {
        sheet_index,
        sheet_name,
        data_rows: table.row_count(),
        table_id,
        table_name,
        table_ref,
        column_widths,
    })
}

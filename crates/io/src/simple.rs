// Flat writer on simple_excel_writer

use simple_excel_writer::{Row, Workbook};
use xlbench_table::{Record, Value};

use crate::error::{Error, Result};
use crate::ooxml::validate_sheet_name;
use crate::region::{RegionError, MAX_ROW};

/// Header row from the field names, then one typed row per record, built
/// in memory through the row builder.
pub fn write_records_flat<'a, R, I>(records: I, sheet_name: &str) -> Result<Vec<u8>>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    validate_sheet_name(sheet_name)?;
    let records: Vec<&R> = records.into_iter().collect();
    if records.len() > MAX_ROW as usize {
        return Err(Error::Region(RegionError::OutOfBounds {
            row: records.len() as u64,
            col: 0,
        }));
    }

    let mut workbook = Workbook::create_in_memory();
    let mut sheet = workbook.create_sheet(sheet_name);
    workbook.write_sheet(&mut sheet, |writer| {
        let mut header = Row::new();
        for field in R::FIELDS {
            header.add_cell(field.name);
        }
        writer.append_row(header)?;

        for record in records.iter().copied() {
            let mut row = Row::new();
            for field in R::FIELDS {
                match field.value_of(record) {
                    Value::Null => row.add_cell(()),
                    Value::Text(s) => row.add_cell(s),
                    Value::Integer(n) => row.add_cell(n as f64),
                    Value::Float(n) => row.add_cell(n),
                    Value::Boolean(b) => row.add_cell(b),
                }
            }
            writer.append_row(row)?;
        }
        Ok(())
    })?;

    log::debug!("simple flat sheet '{}': {} rows", sheet_name, records.len());
    workbook
        .close()?
        .ok_or_else(|| Error::Writer("in-memory workbook returned no bytes".to_string()))
}

// Record sequence -> DataTable projection

use crate::record::Record;
use crate::table::{Column, DataTable};

/// Project records into a table named after the record type.
///
/// Columns come from `R::FIELDS`, not from the data, so an empty input still
/// produces the full column set.
pub fn project<'a, R, I>(records: I) -> DataTable
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    project_named(R::TYPE_NAME, records)
}

pub fn project_named<'a, R, I>(name: &str, records: I) -> DataTable
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut table = DataTable::new(name);
    for field in R::FIELDS {
        table.push_column_unchecked(Column {
            name: field.name.to_string(),
            column_type: field.field_type.core_type(),
        });
    }

    for record in records {
        let values = R::FIELDS.iter().map(|field| field.value_of(record)).collect();
        table.push_row_unchecked(values);
    }

    table
}

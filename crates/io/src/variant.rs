// The writer variants under comparison

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use xlbench_table::{project, Record};

use crate::error::Result;
use crate::ooxml::Package;
use crate::sheet::{create_sheet_from_table, WriteOptions};
use crate::{simple, xlsx};

/// Sheet name used by the flat writers.
pub const FLAT_SHEET_NAME: &str = "export";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Project, then write through the in-crate package writer with a table.
    OoxmlTable,
    /// Flat typed loop on rust_xlsxwriter.
    Xlsxwriter,
    /// Project, then write through rust_xlsxwriter's native table.
    XlsxwriterTable,
    /// Flat typed loop on simple_excel_writer.
    Simple,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown variant '{0}' (expected one of: ooxml-table, xlsxwriter, xlsxwriter-table, simple)")]
pub struct ParseVariantError(pub String);

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::OoxmlTable,
        Variant::Xlsxwriter,
        Variant::XlsxwriterTable,
        Variant::Simple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::OoxmlTable => "ooxml-table",
            Variant::Xlsxwriter => "xlsxwriter",
            Variant::XlsxwriterTable => "xlsxwriter-table",
            Variant::Simple => "simple",
        }
    }

    /// Whether the output carries a table region.
    pub fn is_table(self) -> bool {
        matches!(self, Variant::OoxmlTable | Variant::XlsxwriterTable)
    }

    /// Build one complete workbook from `records` and return its bytes.
    pub fn run<R: Record>(self, records: &[R], options: &WriteOptions) -> Result<Vec<u8>> {
        let bytes = match self {
            Variant::OoxmlTable => {
                let table = project(records);
                let mut package = Package::new();
                create_sheet_from_table(&mut package, 0, &table, options)?;
                package.to_bytes()?
            }
            Variant::Xlsxwriter => xlsx::write_records_flat(records, FLAT_SHEET_NAME)?,
            Variant::XlsxwriterTable => xlsx::write_table_workbook(&project(records), options)?,
            Variant::Simple => simple::write_records_flat(records, FLAT_SHEET_NAME)?,
        };
        log::debug!("{}: {} records -> {} bytes", self, records.len(), bytes.len());
        Ok(bytes)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == lower)
            .ok_or_else(|| ParseVariantError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(variant.name().parse::<Variant>(), Ok(variant));
        }
        assert_eq!("XlsxWriter".parse::<Variant>(), Ok(Variant::Xlsxwriter));
        assert!("npoi".parse::<Variant>().is_err());
    }

    #[test]
    fn test_table_variants() {
        let tables: Vec<Variant> = Variant::ALL.into_iter().filter(|v| v.is_table()).collect();
        assert_eq!(tables, [Variant::OoxmlTable, Variant::XlsxwriterTable]);
    }
}

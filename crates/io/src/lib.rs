// Dataset loading and the spreadsheet writers under benchmark

pub mod csv;
pub mod error;
pub mod hlpi;
pub mod inspect;
pub mod layout;
pub mod ooxml;
pub mod region;
pub mod sheet;
pub mod simple;
pub mod variant;
pub mod xlsx;

pub use error::{Error, Result};
pub use hlpi::HlpiRecord;
pub use ooxml::Package;
pub use region::{AreaRef, CellRef, RegionError, TableRegion};
pub use sheet::{create_sheet_from_table, SheetReport, WriteOptions};
pub use variant::{ParseVariantError, Variant};

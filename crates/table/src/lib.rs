//! `xlbench-table`: records, field descriptors and the generic table they project into.
//!
//! Pure data crate: no IO, no spreadsheet dependencies.

pub mod project;
pub mod record;
pub mod table;
pub mod value;

pub use project::{project, project_named};
pub use record::{FieldDescriptor, Record};
pub use table::{Column, DataTable, TableError};
pub use value::{FieldType, FieldValue, ScalarType, Value};

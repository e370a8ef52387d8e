use std::path::PathBuf;

use thiserror::Error;

use crate::region::RegionError;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Malformed or mistyped CSV row; `line` is 1-based and counts the header.
    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("CSV header is missing column '{0}'")]
    MissingColumn(String),
    #[error("invalid sheet name '{name}': {reason}")]
    SheetName { name: String, reason: &'static str },
    #[error("sheet '{0}' already exists")]
    DuplicateSheet(String),
    #[error("no sheet at index {0}")]
    UnknownSheet(usize),
    #[error("workbook has no sheets")]
    EmptyWorkbook,
    #[error("table {kind} '{value}' is already used in this workbook")]
    DuplicateTable { kind: &'static str, value: String },
    /// rust_xlsxwriter numbers tables in sheet order, so table sheets must be
    /// added by ascending index with no gaps.
    #[error("table sheet index {index} is out of order: the next native table is for index {next}")]
    TableOrder { index: usize, next: usize },
    #[error("column width {0} exceeds 255 characters")]
    ColumnWidth(u32),
    #[error("table region: {0}")]
    Region(#[from] RegionError),
    #[error("table: {0}")]
    Table(#[from] xlbench_table::TableError),
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("workbook writer error: {0}")]
    Writer(String),
    #[error("xlsx read error: {0}")]
    Read(String),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml error: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

// Cell references, areas and validated table regions

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Last addressable worksheet row (0-based).
pub const MAX_ROW: u32 = 1_048_575;
/// Last addressable worksheet column (0-based).
pub const MAX_COL: u16 = 16_383;

pub const DEFAULT_TABLE_STYLE: &str = "TableStyleMedium2";

#[derive(Debug, Error, PartialEq)]
pub enum RegionError {
    /// Excel ignores tables whose id is 0.
    #[error("table id must be >= 1")]
    ZeroId,
    #[error("table must span at least one column")]
    NoColumns,
    #[error("table must span at least one data row below the header")]
    NoDataRows,
    #[error("cell ({row}, {col}) is outside the worksheet")]
    OutOfBounds { row: u64, col: u64 },
    #[error("area {first}:{last} is inverted")]
    Inverted { first: String, last: String },
    #[error("table spans {expected} columns but {found} column names were given")]
    ColumnCount { expected: usize, found: usize },
    #[error("table column {0} has an empty name")]
    EmptyColumnName(u32),
    #[error("table column name '{0}' is used twice")]
    DuplicateColumnName(String),
    #[error("unknown table style '{0}'")]
    UnknownStyle(String),
}

/// Zero-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Result<Self, RegionError> {
        let out_of_bounds = || RegionError::OutOfBounds {
            row: row as u64,
            col: col as u64,
        };
        let row = u32::try_from(row).ok().filter(|r| *r <= MAX_ROW).ok_or_else(out_of_bounds)?;
        let col = u16::try_from(col).ok().filter(|c| *c <= MAX_COL).ok_or_else(out_of_bounds)?;
        Ok(Self { row, col })
    }
}

/// A1-style address, e.g. `B4`.
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letter(self.col as usize), self.row + 1)
    }
}

/// Inclusive rectangular range of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaRef {
    pub first: CellRef,
    pub last: CellRef,
}

impl AreaRef {
    pub fn new(first: CellRef, last: CellRef) -> Result<Self, RegionError> {
        if last.row < first.row || last.col < first.col {
            return Err(RegionError::Inverted {
                first: first.to_string(),
                last: last.to_string(),
            });
        }
        Ok(Self { first, last })
    }

    pub fn row_count(&self) -> usize {
        (self.last.row - self.first.row) as usize + 1
    }

    pub fn col_count(&self) -> usize {
        (self.last.col - self.first.col) as usize + 1
    }
}

impl fmt::Display for AreaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumnDef {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyleInfo {
    pub name: String,
    pub show_row_stripes: bool,
}

/// A worksheet range formatted as an Excel table, with its auto-filter.
///
/// Only constructible through [`TableRegion::new`], so every instance has a
/// positive id, a header row plus at least one data row, and one uniquely
/// named column per spanned worksheet column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    id: u32,
    name: String,
    display_name: String,
    area: AreaRef,
    style: TableStyleInfo,
    columns: Vec<TableColumnDef>,
    auto_filter: AreaRef,
}

impl TableRegion {
    /// Build a region named `Table{id}` over `area`, header row first.
    pub fn new<S: AsRef<str>>(id: u32, area: AreaRef, column_names: &[S]) -> Result<Self, RegionError> {
        if id == 0 {
            return Err(RegionError::ZeroId);
        }
        if area.row_count() < 2 {
            return Err(RegionError::NoDataRows);
        }
        if column_names.len() != area.col_count() {
            return Err(RegionError::ColumnCount {
                expected: area.col_count(),
                found: column_names.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(column_names.len());
        for (position, name) in column_names.iter().enumerate() {
            let name = name.as_ref();
            let column_id = position as u32 + 1;
            if name.is_empty() {
                return Err(RegionError::EmptyColumnName(column_id));
            }
            // Excel compares table column names case-insensitively
            if !seen.insert(name.to_lowercase()) {
                return Err(RegionError::DuplicateColumnName(name.to_string()));
            }
            columns.push(TableColumnDef {
                id: column_id,
                name: name.to_string(),
            });
        }

        let name = format!("Table{id}");
        Ok(Self {
            id,
            display_name: name.clone(),
            name,
            area,
            style: TableStyleInfo {
                name: DEFAULT_TABLE_STYLE.to_string(),
                show_row_stripes: true,
            },
            columns,
            auto_filter: area,
        })
    }

    pub fn with_style(mut self, style: &str, show_row_stripes: bool) -> Result<Self, RegionError> {
        if !is_builtin_table_style(style) {
            return Err(RegionError::UnknownStyle(style.to_string()));
        }
        self.style = TableStyleInfo {
            name: style.to_string(),
            show_row_stripes,
        };
        Ok(self)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn area(&self) -> AreaRef {
        self.area
    }

    pub fn auto_filter(&self) -> AreaRef {
        self.auto_filter
    }

    pub fn style(&self) -> &TableStyleInfo {
        &self.style
    }

    pub fn columns(&self) -> &[TableColumnDef] {
        &self.columns
    }
}

/// `TableStyleLight1..21`, `TableStyleMedium1..28`, `TableStyleDark1..11`.
pub fn is_builtin_table_style(name: &str) -> bool {
    parse_table_style(name).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFamily {
    Light,
    Medium,
    Dark,
}

pub fn parse_table_style(name: &str) -> Option<(StyleFamily, u8)> {
    let rest = name.strip_prefix("TableStyle")?;
    let (family, digits, max) = if let Some(d) = rest.strip_prefix("Light") {
        (StyleFamily::Light, d, 21)
    } else if let Some(d) = rest.strip_prefix("Medium") {
        (StyleFamily::Medium, d, 28)
    } else if let Some(d) = rest.strip_prefix("Dark") {
        (StyleFamily::Dark, d, 11)
    } else {
        return None;
    };
    if digits.starts_with('0') {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (1..=max).contains(&n).then_some((family, n))
}

/// Convert column index to Excel column letter (0 = A, 25 = Z, 26 = AA, etc.)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

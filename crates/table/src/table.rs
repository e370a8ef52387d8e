// In-memory rows and typed columns

use thiserror::Error;

use crate::value::{FieldType, Value};

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("row has {found} values, table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
    #[error("column '{column}' expects {expected}, got {found}")]
    ValueType {
        column: String,
        expected: FieldType,
        found: &'static str,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("cannot add columns to a table that already has rows")]
    ColumnsFrozen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: FieldType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    name: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn unnamed() -> Self {
        Self::default()
    }

    /// Table name, `None` when unset or empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn add_column(&mut self, name: impl Into<String>, column_type: FieldType) -> Result<(), TableError> {
        if !self.rows.is_empty() {
            return Err(TableError::ColumnsFrozen);
        }
        let name = name.into();
        if self.columns.iter().any(|c| c.name == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.push(Column { name, column_type });
        Ok(())
    }

    /// Append a row positionally aligned with the columns.
    ///
    /// Each value must be `Null` or match its column's scalar type.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&values) {
            if let Some(found) = value.scalar_type() {
                if found != column.column_type.scalar() {
                    return Err(TableError::ValueType {
                        column: column.name.clone(),
                        expected: column.column_type,
                        found: found.name(),
                    });
                }
            }
        }
        self.rows.push(values);
        Ok(())
    }

    // Descriptor-built rows are aligned by construction.
    pub(crate) fn push_row_unchecked(&mut self, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(values);
    }

    pub(crate) fn push_column_unchecked(&mut self, column: Column) {
        self.columns.push(column);
    }
}

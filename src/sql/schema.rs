use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::Literal,
        types::{DataType, Row, Value},
    },
};

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the column index for a given column name
    ///
    /// Column names are assumed unique; the first match wins.
    pub fn get_col_index(&self, col_name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == col_name)
            .ok_or_else(|| Error::ColumnNotFound {
                table: self.name.clone(),
                column: col_name.to_string(),
            })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Strips quotes from a literal and validates it against the column at `index`
    pub fn validate_value(&self, index: usize, literal: &Literal) -> Result<Value> {
        let column = self.columns.get(index).ok_or_else(|| {
            Error::Internal(format!("column index {} out of range for {}", index, self.name))
        })?;
        column
            .datatype
            .coerce(literal.text())
            .ok_or_else(|| Error::TypeMismatch {
                table: self.name.clone(),
                column: column.name.clone(),
                datatype: column.datatype.to_string(),
                value: literal.text().to_string(),
            })
    }

    /// Checks the row width invariant
    pub fn check_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Internal(format!(
                "row of width {} does not fit table {} with {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        Ok(())
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    /// Declared constraints; stored but not enforced
    pub constraints: BTreeSet<Constraint>,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Self {
            name: name.into(),
            datatype,
            constraints: BTreeSet::new(),
        }
    }
}

/// Column constraint keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constraint {
    Primary,
    Key,
    Not,
    Null,
    Unique,
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::Condition,
        schema::Table,
        types::{Row, Value},
    },
};

use super::{Catalog, Filter};

/// A table's schema together with its rows, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredTable {
    schema: Table,
    rows: Vec<Row>,
}

impl StoredTable {
    fn filter(&self, condition: Option<&Condition>) -> Result<Option<Filter>> {
        condition.map(|c| Filter::new(&self.schema, c)).transpose()
    }

    fn matching<'a>(
        &'a self,
        filter: &'a Option<Filter>,
    ) -> impl Iterator<Item = (usize, &'a Row)> + 'a {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| filter.as_ref().is_none_or(|f| f.matches(row)))
    }
}

/// In-memory catalog: table name to table, nothing persisted
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: BTreeMap<String, StoredTable>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    fn stored(&self, table_name: &str) -> Result<&StoredTable> {
        self.tables
            .get(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    fn stored_mut(&mut self, table_name: &str) -> Result<&mut StoredTable> {
        self.tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }
}

impl Catalog for MemoryCatalog {
    fn create_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(Error::TableExists(table.name));
        }
        info!("create table {} with {} columns", table.name, table.columns.len());
        self.tables.insert(
            table.name.clone(),
            StoredTable {
                schema: table,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    fn get_table(&self, table_name: &str) -> Result<Option<Table>> {
        Ok(self.tables.get(table_name).map(|t| t.schema.clone()))
    }

    fn create_row(&mut self, table_name: &str, row: Row) -> Result<()> {
        let table = self.stored_mut(table_name)?;
        table.schema.check_row(&row)?;
        info!("insert row {:?} into {}", row, table_name);
        table.rows.push(row);
        Ok(())
    }

    fn scan_table(&self, table_name: &str, filter: Option<&Condition>) -> Result<Vec<Row>> {
        let table = self.stored(table_name)?;
        let filter = table.filter(filter)?;
        Ok(table.matching(&filter).map(|(_, row)| row.clone()).collect())
    }

    fn scan_positions(&self, table_name: &str, filter: Option<&Condition>) -> Result<Vec<usize>> {
        let table = self.stored(table_name)?;
        let filter = table.filter(filter)?;
        Ok(table.matching(&filter).map(|(i, _)| i).collect())
    }

    fn set_cell(
        &mut self,
        table_name: &str,
        row: usize,
        column: usize,
        value: Value,
    ) -> Result<()> {
        let table = self.stored_mut(table_name)?;
        let cell = table
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "cell ({}, {}) out of range in table {}",
                    row, column, table_name
                ))
            })?;
        *cell = value;
        Ok(())
    }

    fn delete_rows(&mut self, table_name: &str, filter: Option<&Condition>) -> Result<usize> {
        let table = self.stored_mut(table_name)?;
        let before = table.rows.len();
        match table.filter(filter)? {
            Some(f) => table.rows.retain(|row| !f.matches(row)),
            None => table.rows.clear(),
        }
        let count = before - table.rows.len();
        info!("deleted {} rows from {}", count, table_name);
        Ok(count)
    }

    fn row_count(&self, table_name: &str) -> Result<usize> {
        Ok(self.stored(table_name)?.rows.len())
    }

    fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.tables)?)
    }

    fn restore(&mut self, snapshot: &[u8]) -> Result<()> {
        self.tables = bincode::deserialize(snapshot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCatalog;
    use crate::{
        error::{Error, Result},
        sql::{
            engine::Catalog,
            parser::ast::{Condition, Literal, Operator},
            schema::{Column, Table},
            types::{DataType, Value},
        },
    };

    fn catalog() -> Result<MemoryCatalog> {
        let mut c = MemoryCatalog::new();
        c.create_table(Table::new(
            "t",
            vec![
                Column::new("id", DataType::Int),
                Column::new("code", DataType::String),
            ],
        ))?;
        for (id, code) in [(1, "10"), (2, "10.5"), (3, "9")] {
            c.create_row("t", vec![Value::Integer(id), Value::Text(code.into())])?;
        }
        Ok(c)
    }

    fn cond(column: &str, operator: Operator, value: Literal) -> Condition {
        Condition {
            column: column.into(),
            operator,
            value,
        }
    }

    #[test]
    fn test_create_table_twice() -> Result<()> {
        let mut c = catalog()?;
        assert_eq!(
            c.create_table(Table::new("t", vec![])),
            Err(Error::TableExists("t".into()))
        );
        Ok(())
    }

    #[test]
    fn test_row_width_enforced() -> Result<()> {
        let mut c = catalog()?;
        assert!(c.create_row("t", vec![Value::Integer(1)]).is_err());
        assert_eq!(c.row_count("t")?, 3);
        Ok(())
    }

    #[test]
    fn test_scan_with_narrow_coercion() -> Result<()> {
        let c = catalog()?;
        // "10" > 9 numerically, "10.5" vs 9 is compared as text and loses
        let gt = cond("code", Operator::GreaterThan, Literal::String("'9'".into()));
        assert_eq!(c.scan_positions("t", Some(&gt))?, vec![0]);

        let ne = cond("id", Operator::NotEqual, Literal::Number("2".into()));
        let rows = c.scan_table("t", Some(&ne))?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Value::Integer(1));
        assert_eq!(rows[1][0], Value::Integer(3));

        let unknown = cond("nope", Operator::Equal, Literal::Number("1".into()));
        assert!(matches!(
            c.scan_table("t", Some(&unknown)),
            Err(Error::ColumnNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_set_cell_and_delete() -> Result<()> {
        let mut c = catalog()?;
        c.set_cell("t", 1, 1, Value::Text("x".into()))?;
        assert!(c.set_cell("t", 7, 1, Value::Null).is_err());
        assert_eq!(c.scan_table("t", None)?[1][1], Value::Text("x".into()));

        let le = cond("id", Operator::LessThanOrEqual, Literal::Number("2".into()));
        assert_eq!(c.delete_rows("t", Some(&le))?, 2);
        assert_eq!(c.delete_rows("t", None)?, 1);
        assert_eq!(c.row_count("t")?, 0);
        assert_eq!(c.row_count("missing"), Err(Error::TableNotFound("missing".into())));
        Ok(())
    }

    #[test]
    fn test_snapshot_restore() -> Result<()> {
        let mut c = catalog()?;
        let snapshot = c.snapshot()?;
        c.delete_rows("t", None)?;
        c.restore(&snapshot)?;
        assert_eq!(c.row_count("t")?, 3);
        Ok(())
    }
}

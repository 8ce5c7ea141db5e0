use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        engine::Catalog,
        executor::{Executor, Outcome},
        parser::ast::{Condition, Literal},
        schema::Table,
        types::{Row, Value},
    },
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    columns: Option<Vec<String>>,
    values: Vec<Literal>,
}

impl Insert {
    pub fn new(
        table_name: String,
        columns: Option<Vec<String>>,
        values: Vec<Literal>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            values,
        })
    }
}

// Values in table order:
// insert into tbl values (1, 'a', 2024-01-01);
//  id    name    born
//  1     a       2024-01-01
fn positional_row(table: &Table, values: &[Literal]) -> Result<Row> {
    if values.len() != table.columns.len() {
        return Err(Error::ValueCount {
            table: table.name.clone(),
            expected: table.columns.len(),
            found: values.len(),
        });
    }
    values
        .iter()
        .enumerate()
        .map(|(i, literal)| table.validate_value(i, literal))
        .collect()
}

// Values for named columns, the rest stays NULL:
// insert into tbl (born, id) values (2024-01-01, 1);
//  id    name    born
//  1     NULL    2024-01-01
fn named_row(table: &Table, columns: &[String], values: &[Literal]) -> Result<Row> {
    if columns.len() != values.len() {
        return Err(Error::ValueCount {
            table: table.name.clone(),
            expected: columns.len(),
            found: values.len(),
        });
    }

    let mut row = vec![Value::Null; table.columns.len()];
    for (col_name, literal) in columns.iter().zip(values) {
        let index = table.get_col_index(col_name)?;
        row[index] = table.validate_value(index, literal)?;
    }
    Ok(row)
}

impl<C: Catalog> Executor<C> for Insert {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        let table = catalog.must_get_table(&self.table_name)?;
        let row = match &self.columns {
            None => positional_row(&table, &self.values)?,
            Some(columns) => named_row(&table, columns, &self.values)?,
        };
        catalog.create_row(&table.name, row)?;
        Ok(Outcome::Insert {
            table_name: self.table_name,
            count: 1,
        })
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    columns: Vec<(String, Literal)>,
    where_clause: Option<Condition>,
}

impl Update {
    pub fn new(
        table_name: String,
        columns: Vec<(String, Literal)>,
        where_clause: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            columns,
            where_clause,
        })
    }
}

impl<C: Catalog> Executor<C> for Update {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        let table = catalog.must_get_table(&self.table_name)?;
        let assignments = self
            .columns
            .iter()
            .map(|(col, literal)| Ok((table.get_col_index(col)?, literal)))
            .collect::<Result<Vec<_>>>()?;

        let positions = catalog.scan_positions(&table.name, self.where_clause.as_ref())?;
        // Assignments run in script order; a failure stops the statement and
        // leaves earlier writes in place
        for &pos in &positions {
            for &(index, literal) in &assignments {
                let value = table.validate_value(index, literal)?;
                debug!("update {}[{}][{}] = {}", table.name, pos, index, value);
                catalog.set_cell(&table.name, pos, index, value)?;
            }
        }

        Ok(Outcome::Update {
            table_name: self.table_name,
            count: positions.len(),
        })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    where_clause: Option<Condition>,
}

impl Delete {
    pub fn new(table_name: String, where_clause: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            table_name,
            where_clause,
        })
    }
}

impl<C: Catalog> Executor<C> for Delete {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        let count = catalog.delete_rows(&self.table_name, self.where_clause.as_ref())?;
        Ok(Outcome::Delete {
            table_name: self.table_name,
            count,
        })
    }
}

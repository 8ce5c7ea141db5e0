use crate::{
    error::{Error, Result},
    sql::{
        engine::Catalog,
        executor::{Executor, Outcome, ResultSet},
        parser::ast::{Condition, SelectColumns},
    },
};

/// Table scan executor, applies the optional WHERE filter
pub struct Scan {
    table_name: String,
    filter: Option<Condition>,
}

impl Scan {
    pub fn new(table_name: String, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl<C: Catalog> Executor<C> for Scan {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        let table = catalog.must_get_table(&self.table_name)?;
        let rows = catalog.scan_table(&self.table_name, self.filter.as_ref())?;
        Ok(Outcome::Query(ResultSet {
            columns: table.column_names(),
            rows,
        }))
    }
}

/// Projection executor - keeps the requested columns, in requested order
pub struct Projection<C: Catalog> {
    source: Box<dyn Executor<C>>,
    table_name: String,
    columns: SelectColumns,
}

impl<C: Catalog> Projection<C> {
    pub fn new(
        source: Box<dyn Executor<C>>,
        table_name: String,
        columns: SelectColumns,
    ) -> Box<Self> {
        Box::new(Self {
            source,
            table_name,
            columns,
        })
    }
}

impl<C: Catalog> Executor<C> for Projection<C> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        match self.source.execute(catalog)? {
            Outcome::Query(result) => {
                let names = match self.columns {
                    SelectColumns::All => return Ok(Outcome::Query(result)),
                    SelectColumns::Named(names) => names,
                };

                // Map requested names to positions in the scanned columns
                let mut positions = Vec::with_capacity(names.len());
                for name in &names {
                    match result.columns.iter().position(|c| c == name) {
                        Some(i) => positions.push(i),
                        None => {
                            return Err(Error::ColumnNotFound {
                                table: self.table_name,
                                column: name.clone(),
                            });
                        }
                    }
                }

                let rows = result
                    .rows
                    .into_iter()
                    .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
                    .collect();
                Ok(Outcome::Query(ResultSet {
                    columns: names,
                    rows,
                }))
            }
            _ => Err(Error::Internal("Unexpected outcome".into())),
        }
    }
}

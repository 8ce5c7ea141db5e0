use crate::{
    error::Result,
    sql::{
        engine::Catalog,
        executor::{Executor, Outcome},
        schema::Table,
    },
};

/// CREATE TABLE executor
pub struct CreateTable {
    schema: Table,
}

impl CreateTable {
    pub fn new(schema: Table) -> Box<Self> {
        Box::new(Self { schema })
    }
}

impl<C: Catalog> Executor<C> for CreateTable {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome> {
        let table_name = self.schema.name.clone();
        catalog.create_table(self.schema)?;
        Ok(Outcome::CreateTable { table_name })
    }
}

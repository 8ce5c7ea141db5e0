use std::fmt::Display;

use crate::{
    error::Result,
    sql::{
        engine::Catalog,
        executor::{
            mutation::{Delete, Insert, Update},
            query::{Projection, Scan},
            schema::CreateTable,
        },
        parser::ast::Statement,
        schema::Table,
        types::Row,
    },
};

mod mutation;
mod query;
mod schema;

/// SQL executor trait, one implementation per statement kind
pub trait Executor<C: Catalog> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<Outcome>;
}

/// Builds an executor from a parsed statement
///
/// The `'static` bound is required for trait object usage in nested executors.
impl<C: Catalog + 'static> dyn Executor<C> {
    pub fn build(stmt: Statement) -> Box<dyn Executor<C>> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(Table::new(name, columns)),
            Statement::Insert {
                table_name,
                columns,
                values,
            } => Insert::new(table_name, columns, values),
            Statement::Select {
                columns,
                table_name,
                where_clause,
            } => Projection::<C>::new(
                Scan::new(table_name.clone(), where_clause),
                table_name,
                columns,
            ),
            Statement::Update {
                table_name,
                columns,
                where_clause,
            } => Update::new(table_name, columns, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
        }
    }
}

/// Rows produced by a SELECT, projected to the requested columns
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Outcome of executing one statement
#[derive(Debug, PartialEq)]
pub enum Outcome {
    CreateTable { table_name: String },
    Insert { table_name: String, count: usize },
    Query(ResultSet),
    Update { table_name: String, count: usize },
    Delete { table_name: String, count: usize },
}

impl Outcome {
    pub fn into_result_set(self) -> Option<ResultSet> {
        match self {
            Outcome::Query(result) => Some(result),
            _ => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::CreateTable { table_name } => write!(f, "table {} created", table_name),
            Outcome::Insert { table_name, count } => {
                write!(f, "{} row(s) inserted into {}", count, table_name)
            }
            Outcome::Query(result) => write!(f, "{} row(s) selected", result.rows.len()),
            Outcome::Update { table_name, count } => {
                write!(f, "{} row(s) updated in {}", count, table_name)
            }
            Outcome::Delete { table_name, count } => {
                write!(f, "{} row(s) deleted from {}", count, table_name)
            }
        }
    }
}

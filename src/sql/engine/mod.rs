use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, Outcome, ResultSet},
        parser::{
            Parser,
            ast::{Condition, Operator, Statement},
            lexer::{LexError, Tokenized, tokenize},
        },
        schema::Table,
        types::{Row, Value},
    },
};

pub mod memory;

/// Table store seam (DDL and DML operations on the catalog)
///
/// Tables are created once and never dropped. Every stored row is exactly as
/// wide as its table's column list.
pub trait Catalog {
    fn create_table(&mut self, table: Table) -> Result<()>;
    fn get_table(&self, table_name: &str) -> Result<Option<Table>>;
    /// Returns table info, returns error if table doesn't exist
    fn must_get_table(&self, table_name: &str) -> Result<Table> {
        self.get_table(table_name)?
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))
    }

    fn create_row(&mut self, table_name: &str, row: Row) -> Result<()>;
    /// Rows matching the optional filter, in storage order
    fn scan_table(&self, table_name: &str, filter: Option<&Condition>) -> Result<Vec<Row>>;
    /// Storage positions of the rows matching the optional filter
    fn scan_positions(&self, table_name: &str, filter: Option<&Condition>) -> Result<Vec<usize>>;
    /// Overwrites one cell in place
    fn set_cell(&mut self, table_name: &str, row: usize, column: usize, value: Value)
        -> Result<()>;
    /// Removes the rows matching the filter, or every row without one
    fn delete_rows(&mut self, table_name: &str, filter: Option<&Condition>) -> Result<usize>;
    fn row_count(&self, table_name: &str) -> Result<usize>;

    /// Serializes the whole catalog
    fn snapshot(&self) -> Result<Vec<u8>>;
    /// Replaces the whole catalog with a previous snapshot
    fn restore(&mut self, snapshot: &[u8]) -> Result<()>;
}

/// A condition bound to a table: the column index is resolved once per statement
#[derive(Debug)]
pub struct Filter {
    index: usize,
    operator: Operator,
    value: Value,
}

impl Filter {
    pub fn new(table: &Table, condition: &Condition) -> Result<Self> {
        Ok(Self {
            index: table.get_col_index(&condition.column)?,
            operator: condition.operator,
            value: Value::from_literal(&condition.value),
        })
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.index)
            .is_some_and(|cell| cell.satisfies(self.operator, &self.value))
    }
}

/// Session configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionOptions {
    /// Restore the catalog to its pre-call state when a statement fails.
    /// Off by default: statements that ran before a failure keep their effects.
    pub atomic: bool,
}

/// Everything a script run produces, in script order
#[derive(Debug, Default, PartialEq)]
pub struct ScriptOutput {
    /// One outcome per executed statement
    pub outcomes: Vec<Outcome>,
    pub lex_errors: Vec<LexError>,
}

impl ScriptOutput {
    /// One message per executed statement
    pub fn messages(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }

    /// One result set per SELECT
    pub fn results(&self) -> Vec<&ResultSet> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                Outcome::Query(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

/// SQL session: owns one catalog and runs statements against it
pub struct Session<C: Catalog> {
    catalog: C,
    options: SessionOptions,
}

impl<C: Catalog + 'static> Session<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_options(catalog, SessionOptions::default())
    }

    pub fn with_options(catalog: C, options: SessionOptions) -> Self {
        Self { catalog, options }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Executes a single statement
    pub fn execute_statement(&mut self, stmt: Statement) -> Result<Outcome> {
        <dyn Executor<C>>::build(stmt).execute(&mut self.catalog)
    }

    /// Executes statements in order, returning one result set per SELECT
    pub fn execute(&mut self, statements: Vec<Statement>) -> Result<Vec<ResultSet>> {
        Ok(self
            .run(statements)?
            .into_iter()
            .filter_map(Outcome::into_result_set)
            .collect())
    }

    /// Tokenizes, parses and executes a whole script
    ///
    /// A syntax error anywhere means nothing runs. An execution error stops
    /// the script at the failing statement.
    pub fn run_script(&mut self, script: &str) -> Result<ScriptOutput> {
        let Tokenized { tokens, errors } = tokenize(script);
        let statements = Parser::new(tokens).parse()?;
        info!("parsed {} statements", statements.len());

        Ok(ScriptOutput {
            outcomes: self.run(statements)?,
            lex_errors: errors,
        })
    }

    fn run(&mut self, statements: Vec<Statement>) -> Result<Vec<Outcome>> {
        let snapshot = match self.options.atomic {
            true => Some(self.catalog.snapshot()?),
            false => None,
        };

        let mut outcomes = Vec::with_capacity(statements.len());
        for stmt in statements {
            match self.execute_statement(stmt) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!("statement failed: {}", err);
                    if let Some(snapshot) = &snapshot {
                        self.catalog.restore(snapshot)?;
                        info!("catalog restored to its state before the failed run");
                    }
                    return Err(err);
                }
            }
        }
        Ok(outcomes)
    }
}

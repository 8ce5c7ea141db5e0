use thiserror::Error;

/// Custom Result type for minisql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minisql
///
/// Lexical problems are not represented here: the lexer reports them as
/// [`LexError`](crate::sql::parser::lexer::LexError) notices and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Syntax error, aborts the whole parse
    #[error("syntax error: {0}")]
    Parse(String),
    #[error("table {0} already exists")]
    TableExists(String),
    #[error("table {0} does not exist")]
    TableNotFound(String),
    #[error("column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    /// Number of supplied values does not line up with the target columns
    #[error("table {table} expects {expected} values, got {found}")]
    ValueCount {
        table: String,
        expected: usize,
        found: usize,
    },
    /// A value failed validation against its column's declared type
    #[error("invalid value {value} for column {column} ({datatype}) in table {table}")]
    TypeMismatch {
        table: String,
        column: String,
        datatype: String,
        value: String,
    },
    #[error("io error {0}")]
    Io(String),
    /// Internal error (broken invariants, snapshot encoding, etc.)
    #[error("internal error {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(value: Box<bincode::ErrorKind>) -> Self {
        Error::Internal(value.to_string())
    }
}

use std::fmt::Display;

use crate::sql::schema::Column;

/// Parsed SQL statements, one variant per supported command
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable { name: String, columns: Vec<Column> },
    /// INSERT statement; `columns` is `None` when values follow table order
    Insert {
        table_name: String,
        columns: Option<Vec<String>>,
        values: Vec<Literal>,
    },
    /// SELECT statement
    Select {
        columns: SelectColumns,
        table_name: String,
        where_clause: Option<Condition>,
    },
    /// UPDATE statement; assignments keep their script order
    Update {
        table_name: String,
        columns: Vec<(String, Literal)>,
        where_clause: Option<Condition>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<Condition>,
    },
}

/// Projection list of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    /// `*`, every column in schema order
    All,
    Named(Vec<String>),
}

/// Literal value as written in the script
///
/// The raw lexeme is kept, quotes included for strings; conversion into a
/// typed cell value happens at execution time against the column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(String),
    String(String),
    Date(String),
}

impl Literal {
    /// Literal text with one pair of enclosing quotes removed
    pub fn text(&self) -> &str {
        match self {
            Literal::String(s) => strip_quotes(s),
            Literal::Number(s) | Literal::Date(s) => s,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(s) | Literal::String(s) | Literal::Date(s) => f.write_str(s),
        }
    }
}

/// Removes a single matching pair of `'` or `"` around `s`, if present
pub fn strip_quotes(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Comparison operators usable in a WHERE clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn from_str(op: &str) -> Option<Operator> {
        Some(match op {
            "=" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<" => Operator::LessThan,
            ">" => Operator::GreaterThan,
            "<=" => Operator::LessThanOrEqual,
            ">=" => Operator::GreaterThanOrEqual,
            _ => return None,
        })
    }

    pub fn to_str(&self) -> &str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThanOrEqual => ">=",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Single predicate: `column operator literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Literal,
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value)
    }
}

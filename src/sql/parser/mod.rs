use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{Condition, Literal, Operator, SelectColumns, Statement};
use crate::sql::parser::lexer::{Keyword, Token, TokenKind};
use crate::sql::schema::{Column, Constraint};
use crate::sql::types::DataType;

pub mod ast;
pub mod lexer;

/// SQL Parser - converts a token stream into a flat list of statements
///
/// Parsing is all-or-nothing: the first syntax error aborts the whole script.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a new parser over a fully materialized token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parses every statement in the token stream
    pub fn parse(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            let stmt = self.parse_statement()?;
            debug!("parsed statement {:?}", stmt);
            statements.push(stmt);
        }
        Ok(statements)
    }

    /// Parses a statement based on its leading keyword
    fn parse_statement(&mut self) -> Result<Statement> {
        let stmt = match self.peek().and_then(Token::keyword) {
            Some(Keyword::Create) => self.parse_create_table()?,
            Some(Keyword::Insert) => self.parse_insert()?,
            Some(Keyword::Select) => self.parse_select()?,
            Some(Keyword::Update) => self.parse_update()?,
            Some(Keyword::Delete) => self.parse_delete()?,
            _ => return Err(self.unexpected("a statement")),
        };
        self.next_expect(TokenKind::Symbol, Some(";"))?;
        Ok(stmt)
    }

    /// Parses CREATE TABLE statement
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Create)?;
        self.next_expect_keyword(Keyword::Table)?;
        let name = self.next_ident()?;
        self.next_expect(TokenKind::Symbol, Some("("))?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column()?);
            if self.next_if(TokenKind::Symbol, Some(",")).is_none() {
                break;
            }
        }
        self.next_expect(TokenKind::Symbol, Some(")"))?;
        Ok(Statement::CreateTable { name, columns })
    }

    /// Parses one column definition: name, type, then any constraint keywords
    fn parse_column(&mut self) -> Result<Column> {
        let name = self.next_ident()?;
        let type_token = self.next_expect(TokenKind::Identifier, None)?;
        let datatype = if type_token.lexeme.eq_ignore_ascii_case("VARCHAR") {
            self.next_expect(TokenKind::Symbol, Some("("))?;
            let len = self.next_expect(TokenKind::Number, None)?;
            let len = len.lexeme.parse().map_err(|_| {
                Error::Parse(format!(
                    "invalid VARCHAR length {} at line {}, column {}",
                    len.lexeme, len.line, len.column
                ))
            })?;
            self.next_expect(TokenKind::Symbol, Some(")"))?;
            DataType::Varchar(len)
        } else {
            DataType::from_name(&type_token.lexeme).ok_or_else(|| {
                Error::Parse(format!(
                    "invalid column type {} at line {}, column {}",
                    type_token.lexeme, type_token.line, type_token.column
                ))
            })?
        };

        let mut column = Column::new(name, datatype);
        // Constraint keywords are taken greedily, in any order
        while let Some(constraint) = self.peek().and_then(Token::keyword).and_then(constraint_of) {
            self.pos += 1;
            column.constraints.insert(constraint);
        }
        Ok(column)
    }

    /// Parses INSERT statement
    fn parse_insert(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Insert)?;
        self.next_expect_keyword(Keyword::Into)?;
        let table_name = self.next_ident()?;

        // Check if specific columns are specified
        let columns = if self.next_if(TokenKind::Symbol, Some("(")).is_some() {
            let cols = self.parse_ident_list()?;
            self.next_expect(TokenKind::Symbol, Some(")"))?;
            Some(cols)
        } else {
            None
        };

        self.next_expect_keyword(Keyword::Values)?;
        self.next_expect(TokenKind::Symbol, Some("("))?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if self.next_if(TokenKind::Symbol, Some(",")).is_none() {
                break;
            }
        }
        self.next_expect(TokenKind::Symbol, Some(")"))?;

        Ok(Statement::Insert {
            table_name,
            columns,
            values,
        })
    }

    /// Parses SELECT statement
    fn parse_select(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Select)?;
        let columns = if self.next_if(TokenKind::Symbol, Some("*")).is_some() {
            SelectColumns::All
        } else {
            SelectColumns::Named(self.parse_ident_list()?)
        };
        self.next_expect_keyword(Keyword::From)?;
        let table_name = self.next_ident()?;

        Ok(Statement::Select {
            columns,
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses UPDATE statement
    fn parse_update(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Update)?;
        let table_name = self.next_ident()?;
        self.next_expect_keyword(Keyword::Set)?;

        let mut columns: Vec<(String, Literal)> = Vec::new();
        loop {
            let col = self.next_ident()?;
            self.next_expect(TokenKind::Operator, Some("="))?;
            let value = self.parse_literal()?;
            // Assigning the same column twice in one statement is rejected
            if columns.iter().any(|(c, _)| *c == col) {
                return Err(Error::Parse(format!("duplicate column {} in UPDATE", col)));
            }
            columns.push((col, value));
            if self.next_if(TokenKind::Symbol, Some(",")).is_none() {
                break;
            }
        }

        Ok(Statement::Update {
            table_name,
            columns,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE statement
    fn parse_delete(&mut self) -> Result<Statement> {
        self.next_expect_keyword(Keyword::Delete)?;
        self.next_expect_keyword(Keyword::From)?;
        let table_name = self.next_ident()?;

        Ok(Statement::Delete {
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses an optional `WHERE column operator literal`
    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if self.next_if(TokenKind::Keyword, Some("WHERE")).is_none() {
            return Ok(None);
        }
        let column = self.next_ident()?;
        let op = self.next_expect(TokenKind::Operator, None)?;
        let operator = Operator::from_str(&op.lexeme).ok_or_else(|| {
            Error::Parse(format!(
                "unknown operator {} at line {}, column {}",
                op.lexeme, op.line, op.column
            ))
        })?;
        let value = self.parse_literal()?;
        Ok(Some(Condition {
            column,
            operator,
            value,
        }))
    }

    /// Parses a NUMBER, STRING or DATE literal
    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.peek() {
            Some(t) if t.kind == TokenKind::Number => Literal::Number(t.lexeme.clone()),
            Some(t) if t.kind == TokenKind::String => Literal::String(t.lexeme.clone()),
            Some(t) if t.kind == TokenKind::Date => Literal::Date(t.lexeme.clone()),
            _ => return Err(self.unexpected("a literal")),
        };
        self.pos += 1;
        Ok(literal)
    }

    /// Parses `ident (, ident)*`
    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut idents = vec![self.next_ident()?];
        while self.next_if(TokenKind::Symbol, Some(",")).is_some() {
            idents.push(self.next_ident()?);
        }
        Ok(idents)
    }

    /// Peeks at the current token
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes the current token iff it has `kind` and, when given, the value `value`
    fn next_if(&mut self, kind: TokenKind, value: Option<&str>) -> Option<Token> {
        let token = self
            .peek()
            .filter(|t| t.kind == kind)
            .filter(|t| value.is_none_or(|v| t.lexeme.eq_ignore_ascii_case(v)))
            .cloned()?;
        self.pos += 1;
        Some(token)
    }

    /// Like `next_if`, but a mismatch is a syntax error
    fn next_expect(&mut self, kind: TokenKind, value: Option<&str>) -> Result<Token> {
        match self.next_if(kind, value) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(value.unwrap_or(kind.to_str()))),
        }
    }

    fn next_expect_keyword(&mut self, keyword: Keyword) -> Result<Token> {
        self.next_expect(TokenKind::Keyword, Some(keyword.to_str()))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        Ok(self.next_expect(TokenKind::Identifier, None)?.lexeme)
    }

    /// Syntax error for the current token, or end of input
    fn unexpected(&self, expected: &str) -> Error {
        Error::Parse(match self.peek() {
            Some(token) => format!(
                "expected {}, got {} at line {}, column {}",
                expected, token, token.line, token.column
            ),
            None => format!("expected {}, got EOF", expected),
        })
    }
}

/// Maps a constraint keyword to its column constraint
fn constraint_of(keyword: Keyword) -> Option<Constraint> {
    Some(match keyword {
        Keyword::Primary => Constraint::Primary,
        Keyword::Key => Constraint::Key,
        Keyword::Not => Constraint::Not,
        Keyword::Null => Constraint::Null,
        Keyword::Unique => Constraint::Unique,
        _ => return None,
    })
}

/// Tokenizes and parses a whole script
///
/// Lexical notices are logged and otherwise dropped; use [`lexer::tokenize`]
/// directly to keep them.
pub fn parse_script(script: &str) -> Result<Vec<Statement>> {
    Parser::new(lexer::tokenize(script).tokens).parse()
}

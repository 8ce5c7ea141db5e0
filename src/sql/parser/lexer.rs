//! SQL Lexer - Tokenizes script text into positioned tokens

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    /// Single-quoted string literal, quotes included in the lexeme
    String,
    Number,
    /// Calendar date literal shaped `YYYY-MM-DD`
    Date,
    /// Comparison operator
    Operator,
    /// Punctuation: `( ) , ; *`
    Symbol,
}

impl TokenKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Date => "DATE",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Symbol => "SYMBOL",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A single lexical token with its source position
///
/// `line` and `column` are both 1-based; columns count characters and restart on every line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Returns the keyword this token stands for, if it is one
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_str(&self.lexeme),
            _ => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.lexeme)
    }
}

/// SQL reserved keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // DDL keywords
    Create,
    Table,
    // DML keywords
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    // Constraint keywords
    Primary,
    Key,
    Not,
    Null,
    Unique,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "CREATE" => Keyword::Create,
            "TABLE" => Keyword::Table,
            "INSERT" => Keyword::Insert,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "UPDATE" => Keyword::Update,
            "SET" => Keyword::Set,
            "DELETE" => Keyword::Delete,
            "PRIMARY" => Keyword::Primary,
            "KEY" => Keyword::Key,
            "NOT" => Keyword::Not,
            "NULL" => Keyword::Null,
            "UNIQUE" => Keyword::Unique,
            _ => return None,
        })
    }

    /// Returns the uppercase string representation of the keyword
    pub fn to_str(&self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::Unique => "UNIQUE",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Non-fatal notice for a character no token pattern accepts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error at line {line}, column {column}: unrecognized character '{character}'")]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub character: char,
}

/// Pattern classes, in the order they are tried at each position
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pattern {
    Date,
    Keyword,
    Identifier,
    String,
    Number,
    Operator,
    Symbol,
    Whitespace,
}

// Every pattern is anchored: it must match exactly at the scan position.
static PATTERNS: LazyLock<Vec<(Pattern, Regex)>> = LazyLock::new(|| {
    [
        (Pattern::Date, r"^\d{4}-\d{2}-\d{2}"),
        (
            Pattern::Keyword,
            r"(?i)^(?:CREATE|TABLE|INSERT|INTO|VALUES|SELECT|FROM|WHERE|UPDATE|SET|DELETE|PRIMARY|KEY|NOT|NULL|UNIQUE)\b",
        ),
        (Pattern::Identifier, r"^[A-Za-z_][A-Za-z0-9_]*"),
        (Pattern::String, r"^'(?:[^'\\]|\\.)*'"),
        (Pattern::Number, r"^\d+(?:\.\d+)?"),
        (Pattern::Operator, r"^(?:!=|<=|>=|=|<|>)"),
        (Pattern::Symbol, r"^[(),;*]"),
        (Pattern::Whitespace, r"^\s+"),
    ]
    .into_iter()
    .map(|(pattern, re)| (pattern, Regex::new(re).expect("token patterns are valid regexes")))
    .collect()
});

/// SQL lexical analyzer over one physical line
///
/// Yields `Ok(token)` for every recognized token and `Err(LexError)` for every
/// character that no pattern accepts; scanning always resumes after the bad character.
pub struct Lexer<'a> {
    line: &'a str,
    line_number: usize,
    pos: usize,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = std::result::Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.line.len() {
            let column = self.column();
            let rest = &self.line[self.pos..];
            match Self::scan(rest) {
                Some((Pattern::Whitespace, len)) => self.pos += len,
                Some((pattern, len)) => {
                    self.pos += len;
                    let token = Self::classify(pattern, &rest[..len], self.line_number, column);
                    debug!("token {} at {}:{}", token, token.line, token.column);
                    return Some(Ok(token));
                }
                None => {
                    let character = rest.chars().next()?;
                    self.pos += character.len_utf8();
                    let err = LexError {
                        line: self.line_number,
                        column,
                        character,
                    };
                    warn!("{}", err);
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for one line of text with its 1-based line number
    pub fn new(line: &'a str, line_number: usize) -> Self {
        Self {
            line,
            line_number,
            pos: 0,
        }
    }

    /// Character-based, 1-based column of the scan position
    fn column(&self) -> usize {
        self.line[..self.pos].chars().count() + 1
    }

    /// Finds the first pattern, in priority order, matching at the start of `rest`
    fn scan(rest: &str) -> Option<(Pattern, usize)> {
        PATTERNS
            .iter()
            .find_map(|(pattern, re)| re.find(rest).map(|m| (*pattern, m.end())))
    }

    fn classify(pattern: Pattern, text: &str, line: usize, column: usize) -> Token {
        let kind = match pattern {
            Pattern::Date => TokenKind::Date,
            Pattern::Keyword => TokenKind::Keyword,
            // Keywords are case-insensitive, everything else keeps its casing
            Pattern::Identifier if Keyword::from_str(text).is_some() => TokenKind::Keyword,
            Pattern::Identifier => TokenKind::Identifier,
            Pattern::String => TokenKind::String,
            Pattern::Number => TokenKind::Number,
            Pattern::Operator => TokenKind::Operator,
            Pattern::Symbol | Pattern::Whitespace => TokenKind::Symbol,
        };
        let lexeme = match kind {
            TokenKind::Keyword => text.to_uppercase(),
            _ => text.to_string(),
        };
        Token::new(kind, lexeme, line, column)
    }
}

/// Tokens of a whole script plus the lexical notices raised along the way
#[derive(Debug, Default, PartialEq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Tokenizes a script line by line, preserving line numbers
pub fn tokenize(script: &str) -> Tokenized {
    let mut out = Tokenized::default();
    for (i, line) in script.lines().enumerate() {
        for item in Lexer::new(line, i + 1) {
            match item {
                Ok(token) => out.tokens.push(token),
                Err(err) => out.errors.push(err),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{tokenize, Keyword, LexError, Lexer, Token, TokenKind};

    fn kinds_and_lexemes(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind, t.lexeme.as_str())).collect()
    }

    #[test]
    fn test_lexer_select() {
        let tokens = Lexer::new("SELECT * FROM t;", 1)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Keyword, "SELECT", 1, 1),
                Token::new(TokenKind::Symbol, "*", 1, 8),
                Token::new(TokenKind::Keyword, "FROM", 1, 10),
                Token::new(TokenKind::Identifier, "t", 1, 15),
                Token::new(TokenKind::Symbol, ";", 1, 16),
            ]
        );
    }

    #[test]
    fn test_lexer_create_table() {
        let out = tokenize(
            "create Table Users (
                Id INT primary key,
                name VARCHAR(20) not null unique
            );",
        );
        assert!(out.errors.is_empty());
        assert_eq!(
            kinds_and_lexemes(&out.tokens),
            vec![
                (TokenKind::Keyword, "CREATE"),
                (TokenKind::Keyword, "TABLE"),
                (TokenKind::Identifier, "Users"),
                (TokenKind::Symbol, "("),
                (TokenKind::Identifier, "Id"),
                (TokenKind::Identifier, "INT"),
                (TokenKind::Keyword, "PRIMARY"),
                (TokenKind::Keyword, "KEY"),
                (TokenKind::Symbol, ","),
                (TokenKind::Identifier, "name"),
                (TokenKind::Identifier, "VARCHAR"),
                (TokenKind::Symbol, "("),
                (TokenKind::Number, "20"),
                (TokenKind::Symbol, ")"),
                (TokenKind::Keyword, "NOT"),
                (TokenKind::Keyword, "NULL"),
                (TokenKind::Keyword, "UNIQUE"),
                (TokenKind::Symbol, ")"),
                (TokenKind::Symbol, ";"),
            ]
        );
        assert_eq!(out.tokens[4].line, 2);
        assert_eq!(out.tokens[4].column, 17);
        assert_eq!(out.tokens[0].keyword(), Some(Keyword::Create));
    }

    #[test]
    fn test_lexer_literals() {
        let out = tokenize("insert into t values (2024-01-31, 'it\\'s', 3.25, 42);");
        assert!(out.errors.is_empty());
        assert_eq!(
            kinds_and_lexemes(&out.tokens[4..12]),
            vec![
                (TokenKind::Symbol, "("),
                (TokenKind::Date, "2024-01-31"),
                (TokenKind::Symbol, ","),
                (TokenKind::String, "'it\\'s'"),
                (TokenKind::Symbol, ","),
                (TokenKind::Number, "3.25"),
                (TokenKind::Symbol, ","),
                (TokenKind::Number, "42"),
            ]
        );
    }

    #[test]
    fn test_lexer_operators() {
        let out = tokenize("a != 1 b <= 2 c >= 3 d = 4 e < 5 f > 6");
        let ops = out
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ops, vec!["!=", "<=", ">=", "=", "<", ">"]);
    }

    #[test]
    fn test_lexer_keyword_prefix_is_identifier() {
        let out = tokenize("selected tables");
        assert_eq!(
            kinds_and_lexemes(&out.tokens),
            vec![
                (TokenKind::Identifier, "selected"),
                (TokenKind::Identifier, "tables"),
            ]
        );
    }

    #[test]
    fn test_lexer_recovers_from_bad_characters() {
        let out = tokenize("SELECT # FROM t;\nDELETE FROM @t;");
        assert_eq!(
            out.errors,
            vec![
                LexError {
                    line: 1,
                    column: 8,
                    character: '#',
                },
                LexError {
                    line: 2,
                    column: 13,
                    character: '@',
                },
            ]
        );
        assert_eq!(out.tokens.len(), 8);
        assert_eq!(out.tokens[5].lexeme, "FROM");
        assert_eq!(out.tokens[5].line, 2);
        assert_eq!(out.tokens[6], Token::new(TokenKind::Identifier, "t", 2, 14));
    }
}

use std::{borrow::Cow, cmp::Ordering, fmt::Display, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sql::parser::ast::{Literal, Operator};

/// Supported column types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Number,
    String,
    Date,
    /// Declared maximum length, not enforced
    Varchar(usize),
}

impl DataType {
    /// Resolves a declared type name; `VARCHAR` is handled by the parser since it needs a length
    pub fn from_name(name: &str) -> Option<DataType> {
        Some(match name.to_uppercase().as_ref() {
            "INT" => DataType::Int,
            "NUMBER" => DataType::Number,
            "STRING" => DataType::String,
            "DATE" => DataType::Date,
            _ => return None,
        })
    }

    /// Validates literal text against this type, producing the stored cell value
    ///
    /// Integers are 64-bit signed; digits outside that range do not validate.
    pub fn coerce(&self, text: &str) -> Option<Value> {
        match self {
            DataType::Int | DataType::Number => text.parse().ok().map(Value::Integer),
            DataType::String | DataType::Varchar(_) => Some(Value::Text(text.to_string())),
            DataType::Date => parse_date(text).map(Value::Date),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Number => write!(f, "NUMBER"),
            DataType::String => write!(f, "STRING"),
            DataType::Date => write!(f, "DATE"),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
        }
    }
}

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape regex is valid"));

/// Strict `YYYY-MM-DD` parsing: exact digit shape and a real calendar day
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Stored cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Column not supplied by an INSERT with an explicit column list
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Builds the right-hand side of a condition from its literal
    ///
    /// Date literals that name a real day become dates, everything else stays text.
    pub fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Date(s) => parse_date(s).map_or_else(|| Value::Text(s.clone()), Value::Date),
            _ => Value::Text(literal.text().to_string()),
        }
    }

    /// Narrow coercion applied before every comparison
    ///
    /// Only text made entirely of ASCII digits becomes an integer. Signed or
    /// fractional text such as `-3` or `3.5` is left alone.
    pub fn normalize(&self) -> Cow<'_, Value> {
        match self {
            Value::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                match s.parse() {
                    Ok(i) => Cow::Owned(Value::Integer(i)),
                    Err(_) => Cow::Borrowed(self),
                }
            }
            _ => Cow::Borrowed(self),
        }
    }

    /// Compares two cells after narrow coercion
    ///
    /// Same-kind operands compare naturally; mixed kinds compare their text forms.
    /// Null is not comparable with anything.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (&*self.normalize(), &*other.normalize()) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (a, b) => Some(a.to_string().cmp(&b.to_string())),
        }
    }

    /// Evaluates `self <operator> other`
    pub fn satisfies(&self, operator: Operator, other: &Value) -> bool {
        let ord = self.compare(other);
        match operator {
            Operator::Equal => ord == Some(Ordering::Equal),
            Operator::NotEqual => ord != Some(Ordering::Equal),
            Operator::LessThan => ord == Some(Ordering::Less),
            Operator::GreaterThan => ord == Some(Ordering::Greater),
            Operator::LessThanOrEqual => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            Operator::GreaterThanOrEqual => {
                matches!(ord, Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

/// A row is a vector of values, one per table column
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_date, DataType, Value};
    use crate::sql::parser::ast::{Literal, Operator};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_coerce_by_type() {
        assert_eq!(DataType::Int.coerce("42"), Some(Value::Integer(42)));
        assert_eq!(DataType::Number.coerce("-7"), Some(Value::Integer(-7)));
        assert_eq!(DataType::Int.coerce("x"), None);
        assert_eq!(DataType::Int.coerce("3.5"), None);
        assert_eq!(DataType::Int.coerce("9223372036854775807"), Some(Value::Integer(i64::MAX)));
        assert_eq!(DataType::Int.coerce("99999999999999999999"), None);
        assert_eq!(DataType::String.coerce("42"), Some(text("42")));
        assert_eq!(DataType::Varchar(2).coerce("longer"), Some(text("longer")));
        assert_eq!(
            DataType::Date.coerce("2024-02-29"),
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
    }

    #[test]
    fn test_strict_dates() {
        assert!(parse_date("2024-01-01").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("2024-1-01").is_none());
        assert!(parse_date("2024-01-01x").is_none());
    }

    #[test]
    fn test_narrow_coercion() {
        // "10" > "9" numerically once both sides are pure digits
        assert!(text("10").satisfies(Operator::GreaterThan, &text("9")));
        // "10.5" is not coerced, so "10.5" vs 9 falls back to text order
        assert!(!text("10.5").satisfies(Operator::GreaterThan, &text("9")));
        assert!(text("10.5").satisfies(Operator::LessThan, &text("9")));
        // signed text is not coerced either
        assert_eq!(*text("-3").normalize(), text("-3"));
        assert_eq!(*text("007").normalize(), Value::Integer(7));
        // digits past the i64 range stay text
        assert_eq!(*text("99999999999999999999").normalize(), text("99999999999999999999"));
        assert!(Value::Integer(10).satisfies(Operator::Equal, &text("10")));
    }

    #[test]
    fn test_compare_dates_and_null() {
        let d = Value::from_literal(&Literal::Date("2024-05-01".into()));
        assert!(matches!(d, Value::Date(_)));
        let earlier = Value::from_literal(&Literal::Date("2024-04-30".into()));
        assert!(d.satisfies(Operator::GreaterThanOrEqual, &earlier));
        assert!(d.satisfies(Operator::Equal, &text("2024-05-01")));

        assert!(!Value::Null.satisfies(Operator::Equal, &Value::Null));
        assert!(Value::Null.satisfies(Operator::NotEqual, &Value::Integer(1)));
        assert!(!Value::Null.satisfies(Operator::LessThan, &Value::Integer(1)));
    }

    #[test]
    fn test_condition_literal_quotes_stripped() {
        let v = Value::from_literal(&Literal::String("'9'".into()));
        assert_eq!(v, text("9"));
        assert!(Value::Integer(10).satisfies(Operator::GreaterThan, &v));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value appearing in a schema: an allowed/forbidden entry, a
/// threshold, or a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    /// Numeric view of the literal. Text parses if it holds a number.
    /// `inf` and `NaN` have no spreadsheet spelling and are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(value) => Some(*value as f64),
            Literal::Decimal(value) => Some(*value),
            Literal::Text(value) => value.trim().parse::<f64>().ok(),
            Literal::Bool(_) => None,
        }
        .filter(|value| value.is_finite())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true if the literal can be written as a bare number.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Compares by rendered value, so `9606` matches `"9606"` and `1` matches `1.0`.
    pub fn same_value(&self, other: &Literal) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Decimal(value) => write!(f, "{value}"),
            Literal::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Decimal(value)
    }
}

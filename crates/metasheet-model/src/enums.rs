//! Closed vocabularies for field schemas.
//!
//! Each enum carries an explicit mapping to the string key used in schema
//! documents, so the wire format and the Rust names can evolve separately.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys a Schema Node may carry to express validation rules.
///
/// The wire names follow the Cerberus-style vocabulary used by the schema
/// documents (`min`, `max_exclusive`, `anyof`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKey {
    Type,
    Required,
    Allowed,
    Default,
    Empty,
    Anyof,
    #[serde(rename = "min")]
    MinInclusive,
    MinExclusive,
    #[serde(rename = "max")]
    MaxInclusive,
    MaxExclusive,
    Forbidden,
    Regex,
    Unique,
}

impl ValidationKey {
    /// Every validation key, in declaration order.
    pub const ALL: [ValidationKey; 13] = [
        ValidationKey::Type,
        ValidationKey::Required,
        ValidationKey::Allowed,
        ValidationKey::Default,
        ValidationKey::Empty,
        ValidationKey::Anyof,
        ValidationKey::MinInclusive,
        ValidationKey::MinExclusive,
        ValidationKey::MaxInclusive,
        ValidationKey::MaxExclusive,
        ValidationKey::Forbidden,
        ValidationKey::Regex,
        ValidationKey::Unique,
    ];

    /// Returns the key as it appears in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKey::Type => "type",
            ValidationKey::Required => "required",
            ValidationKey::Allowed => "allowed",
            ValidationKey::Default => "default",
            ValidationKey::Empty => "empty",
            ValidationKey::Anyof => "anyof",
            ValidationKey::MinInclusive => "min",
            ValidationKey::MinExclusive => "min_exclusive",
            ValidationKey::MaxInclusive => "max",
            ValidationKey::MaxExclusive => "max_exclusive",
            ValidationKey::Forbidden => "forbidden",
            ValidationKey::Regex => "regex",
            ValidationKey::Unique => "unique",
        }
    }
}

impl fmt::Display for ValidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValidationKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        ValidationKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| format!("Unknown validation key: {s}"))
    }
}

/// Declared data type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Free text; any value is well-typed.
    Text,
    /// Whole numbers.
    Integer,
    /// Any number, including fractions.
    Decimal,
    /// Date and/or time of variable precision (`2008`, `2008-12`, ... `2008-12-03 14:12:09`).
    DateTime,
}

impl FieldType {
    /// Returns the canonical type name used in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Integer => "integer",
            FieldType::Decimal => "number",
            FieldType::DateTime => "datetime",
        }
    }

    /// Returns true for types compared with native numeric semantics.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }

    /// Returns true when literals of this type are written as quoted strings in formulas.
    pub fn quotes_literals(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::DateTime)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    /// Parse a declared type name.
    /// Accepts the canonical names plus the aliases the form layer emits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "string" | "text" | "str" => Ok(FieldType::Text),
            "integer" | "int" => Ok(FieldType::Integer),
            "number" | "decimal" | "float" => Ok(FieldType::Decimal),
            "datetime" => Ok(FieldType::DateTime),
            _ => Err(format!("Unknown field type: {s}")),
        }
    }
}

/// Standard missing-value terms a field may accept in place of real data.
///
/// Values per <https://www.ebi.ac.uk/ena/about/missing-values-reporting>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValue {
    NotApplicable,
    NotCollected,
    NotProvided,
    RestrictedAccess,
}

impl MissingValue {
    pub const ALL: [MissingValue; 4] = [
        MissingValue::NotApplicable,
        MissingValue::NotCollected,
        MissingValue::NotProvided,
        MissingValue::RestrictedAccess,
    ];

    /// The value written into the spreadsheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingValue::NotApplicable => "not applicable",
            MissingValue::NotCollected => "not collected",
            MissingValue::NotProvided => "not provided",
            MissingValue::RestrictedAccess => "restricted access",
        }
    }

    /// The identifier used by form inputs, which avoid spaces and punctuation.
    pub fn input_name(&self) -> &'static str {
        match self {
            MissingValue::NotApplicable => "ebi_not_applicable",
            MissingValue::NotCollected => "ebi_not_collected",
            MissingValue::NotProvided => "ebi_not_provided",
            MissingValue::RestrictedAccess => "ebi_restricted",
        }
    }

    /// Resolve a form input identifier back to its missing value.
    pub fn from_input_name(name: &str) -> Option<Self> {
        MissingValue::ALL
            .into_iter()
            .find(|value| value.input_name() == name.trim())
    }
}

impl fmt::Display for MissingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

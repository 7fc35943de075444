//! Field naming rules.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use metasheet_model::FieldSchemas;
use regex::Regex;

use crate::error::{Result, SchemaError};

/// Suffix of the companion field that records a field's units.
pub const UNITS_SUFFIX: &str = "_units";

/// Suffix appended to fields holding protected health information.
pub const PHI_SUFFIX: &str = "_phi";

static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*$").expect("Invalid field name regex")
});

/// Names the downstream metadata store manages itself.
const BUILTIN_RESERVED: &[&str] = &[
    "sample_id",
    "qiita_study_id",
    "study_id",
    "description",
    "barcode",
    "linkerprimersequence",
];

/// Validates user-chosen field names.
#[derive(Debug, Clone)]
pub struct FieldNameRules {
    reserved: BTreeSet<String>,
}

impl Default for FieldNameRules {
    fn default() -> Self {
        Self::new(BUILTIN_RESERVED.iter().copied())
    }
}

impl FieldNameRules {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(|name| name.into().to_lowercase()).collect(),
        }
    }

    /// Adds names on top of the ones already reserved.
    pub fn with_reserved<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved
            .extend(names.into_iter().map(|name| name.into().to_lowercase()));
        self
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_lowercase())
    }

    pub fn check(&self, name: &str) -> Result<()> {
        if !FIELD_NAME.is_match(name) {
            return Err(SchemaError::InvalidFieldName {
                name: name.to_string(),
            });
        }
        if self.is_reserved(name) {
            return Err(SchemaError::ReservedFieldName {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Name of the companion units field for `field_name`.
pub fn units_field_name(field_name: &str) -> String {
    format!("{field_name}{UNITS_SUFFIX}")
}

/// Renames every field flagged `is_phi` to carry the `_phi` suffix.
/// Names that already end in the suffix are left alone.
pub fn rewrite_phi_field_names(schemas: FieldSchemas) -> FieldSchemas {
    schemas
        .into_iter()
        .map(|(name, node)| {
            if node.is_phi == Some(true) && !name.ends_with(PHI_SUFFIX) {
                (format!("{name}{PHI_SUFFIX}"), node)
            } else {
                (name, node)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metasheet_model::SchemaNode;

    #[test]
    fn names_must_be_lowercase_identifiers() {
        let rules = FieldNameRules::default();
        assert!(rules.check("host_age").is_ok());
        assert!(rules.check("ph2").is_ok());
        for bad in ["Host_age", "2nd_dose", "host age", "_hidden", ""] {
            assert!(
                matches!(rules.check(bad), Err(SchemaError::InvalidFieldName { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn reserved_names_are_rejected() {
        let rules = FieldNameRules::new(["sample_id"]);
        let err = rules.check("sample_id").unwrap_err();
        assert_eq!(err.to_string(), "field name sample_id is reserved");
        assert!(rules.check("sample_type").is_ok());

        let extended = rules.with_reserved(["Sample_Type"]);
        assert!(extended.is_reserved("sample_type"));
        assert!(extended.is_reserved("sample_id"));
    }

    #[test]
    fn phi_fields_gain_suffix() {
        let schemas = FieldSchemas::from([
            ("dob".to_string(), SchemaNode::new().with_phi(true)),
            ("zip_phi".to_string(), SchemaNode::new().with_phi(true)),
            ("age".to_string(), SchemaNode::new().with_phi(false)),
        ]);
        let renamed = rewrite_phi_field_names(schemas);
        let names: Vec<_> = renamed.keys().map(String::as_str).collect();
        assert_eq!(names, ["age", "dob_phi", "zip_phi"]);
    }
}

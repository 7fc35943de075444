//! The Schema Node: declarative validation rules for one field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FieldType, Literal, ValidationKey};

/// Field name to Schema Node, ordered by field name.
///
/// The ordering is what downstream grid writers rely on to keep the
/// metadata, validation, and description outputs aligned.
pub type FieldSchemas = BTreeMap<String, SchemaNode>;

/// Validation rules for one field (or one `anyof` alternative).
///
/// Keys present on the same node are AND-ed; the `anyof` children are OR-ed
/// and the result is AND-ed with the node's own keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaNode {
    /// Declared type name. Kept as written so an unknown name is reported
    /// when the schema is compiled rather than when it is parsed.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Literal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden: Option<Vec<Literal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_exclusive: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_exclusive: Option<Literal>,
    /// Name (or pattern) of a registered format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anyof: Option<Vec<SchemaNode>>,

    /// Free-text description shown ahead of the generated guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_desc: Option<String>,
    /// Name of the companion field holding this field's units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_phi: Option<bool>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(field_type: FieldType) -> Self {
        Self::new().with_type(field_type)
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.data_type = Some(field_type.as_str().to_string());
        self
    }

    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.data_type = Some(name.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty = Some(empty);
        self
    }

    pub fn with_allowed<I, L>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_forbidden<I, L>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        self.forbidden = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min(mut self, threshold: impl Into<Literal>) -> Self {
        self.min = Some(threshold.into());
        self
    }

    pub fn with_min_exclusive(mut self, threshold: impl Into<Literal>) -> Self {
        self.min_exclusive = Some(threshold.into());
        self
    }

    pub fn with_max(mut self, threshold: impl Into<Literal>) -> Self {
        self.max = Some(threshold.into());
        self
    }

    pub fn with_max_exclusive(mut self, threshold: impl Into<Literal>) -> Self {
        self.max_exclusive = Some(threshold.into());
        self
    }

    pub fn with_regex(mut self, format: impl Into<String>) -> Self {
        self.regex = Some(format.into());
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    pub fn with_default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_anyof(mut self, alternatives: Vec<SchemaNode>) -> Self {
        self.anyof = Some(alternatives);
        self
    }

    pub fn with_field_desc(mut self, description: impl Into<String>) -> Self {
        self.field_desc = Some(description.into());
        self
    }

    pub fn with_units(mut self, units_field: impl Into<String>) -> Self {
        self.units = Some(units_field.into());
        self
    }

    pub fn with_phi(mut self, is_phi: bool) -> Self {
        self.is_phi = Some(is_phi);
        self
    }

    /// Returns true if the node carries the given key.
    pub fn has(&self, key: ValidationKey) -> bool {
        match key {
            ValidationKey::Type => self.data_type.is_some(),
            ValidationKey::Required => self.required.is_some(),
            ValidationKey::Allowed => self.allowed.is_some(),
            ValidationKey::Default => self.default.is_some(),
            ValidationKey::Empty => self.empty.is_some(),
            ValidationKey::Anyof => self.anyof.is_some(),
            ValidationKey::MinInclusive => self.min.is_some(),
            ValidationKey::MinExclusive => self.min_exclusive.is_some(),
            ValidationKey::MaxInclusive => self.max.is_some(),
            ValidationKey::MaxExclusive => self.max_exclusive.is_some(),
            ValidationKey::Forbidden => self.forbidden.is_some(),
            ValidationKey::Regex => self.regex.is_some(),
            ValidationKey::Unique => self.unique.is_some(),
        }
    }

    /// Keys present on this node, in vocabulary order.
    pub fn keys(&self) -> Vec<ValidationKey> {
        ValidationKey::ALL
            .into_iter()
            .filter(|key| self.has(*key))
            .collect()
    }

    /// Threshold stored under one of the four comparison keys.
    pub fn threshold(&self, key: ValidationKey) -> Option<&Literal> {
        match key {
            ValidationKey::MinInclusive => self.min.as_ref(),
            ValidationKey::MinExclusive => self.min_exclusive.as_ref(),
            ValidationKey::MaxInclusive => self.max.as_ref(),
            ValidationKey::MaxExclusive => self.max_exclusive.as_ref(),
            _ => None,
        }
    }

    pub fn alternatives(&self) -> &[SchemaNode] {
        self.anyof.as_deref().unwrap_or(&[])
    }

    /// Returns true if the node sets any key that must be replaced as a
    /// coherent group (every validation key, plus `units`).
    pub fn has_group_keys(&self) -> bool {
        self.units.is_some() || ValidationKey::ALL.into_iter().any(|key| self.has(key))
    }

    /// Copy of the node with every group key removed; only the independent
    /// annotations (`field_desc`, `is_phi`) survive.
    pub fn without_group_keys(&self) -> SchemaNode {
        SchemaNode {
            field_desc: self.field_desc.clone(),
            is_phi: self.is_phi,
            ..SchemaNode::default()
        }
    }

    /// Shallow overwrite: every key set on `modifications` replaces the
    /// corresponding key of `self`; unset keys are kept.
    pub fn overlaid_with(&self, modifications: &SchemaNode) -> SchemaNode {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }
        SchemaNode {
            data_type: pick(&self.data_type, &modifications.data_type),
            required: pick(&self.required, &modifications.required),
            empty: pick(&self.empty, &modifications.empty),
            allowed: pick(&self.allowed, &modifications.allowed),
            forbidden: pick(&self.forbidden, &modifications.forbidden),
            min: pick(&self.min, &modifications.min),
            min_exclusive: pick(&self.min_exclusive, &modifications.min_exclusive),
            max: pick(&self.max, &modifications.max),
            max_exclusive: pick(&self.max_exclusive, &modifications.max_exclusive),
            regex: pick(&self.regex, &modifications.regex),
            unique: pick(&self.unique, &modifications.unique),
            default: pick(&self.default, &modifications.default),
            anyof: pick(&self.anyof, &modifications.anyof),
            field_desc: pick(&self.field_desc, &modifications.field_desc),
            units: pick(&self.units, &modifications.units),
            is_phi: pick(&self.is_phi, &modifications.is_phi),
        }
    }
}

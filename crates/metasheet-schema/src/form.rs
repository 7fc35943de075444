//! Building field schemas from form submissions.
//!
//! A form describes one field through named inputs (`field_name`,
//! `field_type`, `minimum_value`, ...). Inputs may be grouped into nested
//! objects by the submitting client; groups are flattened before reading.

use std::collections::BTreeMap;

use metasheet_catalog::RegexCatalog;
use metasheet_model::{FieldSchemas, FieldType, Literal, MissingValue, SchemaNode, ValidationKey};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::names::{FieldNameRules, units_field_name};

/// One value of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormEntry {
    Leaf(String),
    List(Vec<String>),
    Group(BTreeMap<String, FormEntry>),
}

/// Named form inputs, mapped to their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputName {
    FieldName,
    FieldType,
    FieldDesc,
    AllowedMissingValues,
    DefaultChoice,
    AllowedMissingDefault,
    CategoricalDefault,
    ContinuousDefault,
    BooleanDefault,
    TextDefault,
    TrueValue,
    FalseValue,
    DataType,
    CategoricalValues,
    MinimumComparison,
    MinimumValue,
    MaximumComparison,
    MaximumValue,
    Units,
    IsPhi,
}

impl InputName {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputName::FieldName => "field_name",
            InputName::FieldType => "field_type",
            InputName::FieldDesc => "field_desc",
            InputName::AllowedMissingValues => "allowed_missing_vals[]",
            InputName::DefaultChoice => "default_value",
            InputName::AllowedMissingDefault => "allowed_missing_default_select",
            InputName::CategoricalDefault => "categorical_default_select",
            InputName::ContinuousDefault => "continuous_default",
            InputName::BooleanDefault => "boolean_default_select",
            InputName::TextDefault => "text_default",
            InputName::TrueValue => "true_value",
            InputName::FalseValue => "false_value",
            InputName::DataType => "data_type",
            InputName::CategoricalValues => "categorical_values",
            InputName::MinimumComparison => "minimum_comparison",
            InputName::MinimumValue => "minimum_value",
            InputName::MaximumComparison => "maximum_comparison",
            InputName::MaximumValue => "maximum_value",
            InputName::Units => "units",
            InputName::IsPhi => "is_phi",
        }
    }
}

/// Which input, if any, supplies the field's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSource {
    NoDefault,
    Boolean,
    AllowedMissing,
    Categorical,
    Continuous,
    Text,
}

impl DefaultSource {
    fn parse(field: &str, raw: &str) -> Result<Self> {
        match raw.trim() {
            "" | "no_default" => Ok(Self::NoDefault),
            "boolean_default" => Ok(Self::Boolean),
            "allowed_missing_default" => Ok(Self::AllowedMissing),
            "categorical_default" => Ok(Self::Categorical),
            "continuous_default" => Ok(Self::Continuous),
            "text_default" => Ok(Self::Text),
            other => Err(SchemaError::InvalidFormValue {
                field: field.to_string(),
                input: InputName::DefaultChoice.as_str(),
                value: other.to_string(),
            }),
        }
    }

    fn input(&self) -> Option<InputName> {
        match self {
            Self::NoDefault => None,
            Self::Boolean => Some(InputName::BooleanDefault),
            Self::AllowedMissing => Some(InputName::AllowedMissingDefault),
            Self::Categorical => Some(InputName::CategoricalDefault),
            Self::Continuous => Some(InputName::ContinuousDefault),
            Self::Text => Some(InputName::TextDefault),
        }
    }
}

/// A numeric or date/time bound on a continuous field.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub key: ValidationKey,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Boolean {
        true_label: String,
        false_label: String,
    },
    Categorical {
        values: Vec<String>,
    },
    Continuous {
        data_type: FieldType,
        minimum: Option<Bound>,
        maximum: Option<Bound>,
    },
}

/// A field as described by a form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub description: Option<String>,
    pub allowed_missing: Vec<MissingValue>,
    pub default: Option<Literal>,
    pub units: Option<String>,
    pub is_phi: bool,
}

/// Flattened view of a form: every input name to its values.
struct Inputs<'f> {
    field: String,
    values: BTreeMap<&'f str, Vec<&'f str>>,
}

impl<'f> Inputs<'f> {
    fn flatten(entries: &'f BTreeMap<String, FormEntry>) -> BTreeMap<&'f str, Vec<&'f str>> {
        fn walk<'f>(
            entries: &'f BTreeMap<String, FormEntry>,
            out: &mut BTreeMap<&'f str, Vec<&'f str>>,
        ) {
            for (name, entry) in entries {
                match entry {
                    FormEntry::Leaf(value) => {
                        out.insert(name, vec![value.as_str()]);
                    }
                    FormEntry::List(values) => {
                        out.insert(name, values.iter().map(String::as_str).collect());
                    }
                    FormEntry::Group(group) => walk(group, out),
                }
            }
        }
        let mut out = BTreeMap::new();
        walk(entries, &mut out);
        out
    }

    /// First non-blank value of an input.
    fn get(&self, input: InputName) -> Option<&'f str> {
        self.values
            .get(input.as_str())
            .and_then(|values| values.first())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn require(&self, input: InputName) -> Result<&'f str> {
        self.get(input).ok_or_else(|| SchemaError::MissingFormValue {
            field: self.field.clone(),
            input: input.as_str(),
        })
    }

    fn list(&self, input: InputName) -> Vec<&'f str> {
        self.values
            .get(input.as_str())
            .map(|values| {
                values
                    .iter()
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn invalid(&self, input: InputName, value: &str) -> SchemaError {
        SchemaError::InvalidFormValue {
            field: self.field.clone(),
            input: input.as_str(),
            value: value.to_string(),
        }
    }
}

impl FormField {
    /// Read a field from its form inputs.
    pub fn from_entries(entries: &BTreeMap<String, FormEntry>) -> Result<Self> {
        let values = Inputs::flatten(entries);
        let mut inputs = Inputs {
            field: "(unnamed)".to_string(),
            values,
        };
        let name = inputs.require(InputName::FieldName)?.to_string();
        inputs.field.clone_from(&name);

        let kind = match inputs.require(InputName::FieldType)? {
            "string" | "text" => FieldKind::Text,
            "boolean" => FieldKind::Boolean {
                true_label: inputs.require(InputName::TrueValue)?.to_string(),
                false_label: inputs.require(InputName::FalseValue)?.to_string(),
            },
            "categorical" => FieldKind::Categorical {
                values: split_categories(inputs.require(InputName::CategoricalValues)?),
            },
            "continuous" => {
                let raw = inputs.require(InputName::DataType)?;
                let data_type: FieldType = raw
                    .parse()
                    .map_err(|_| inputs.invalid(InputName::DataType, raw))?;
                FieldKind::Continuous {
                    data_type,
                    minimum: read_bound(
                        &inputs,
                        data_type,
                        InputName::MinimumValue,
                        InputName::MinimumComparison,
                    )?,
                    maximum: read_bound(
                        &inputs,
                        data_type,
                        InputName::MaximumValue,
                        InputName::MaximumComparison,
                    )?,
                }
            }
            other => return Err(inputs.invalid(InputName::FieldType, other)),
        };

        let allowed_missing = inputs
            .list(InputName::AllowedMissingValues)
            .into_iter()
            .map(|item| {
                MissingValue::from_input_name(item).ok_or_else(|| SchemaError::UnknownMissingValue {
                    name: item.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let default = match inputs.get(InputName::DefaultChoice) {
            None => None,
            Some(choice) => match DefaultSource::parse(&name, choice)?.input() {
                None => None,
                Some(input) => {
                    let raw = inputs.require(input)?;
                    Some(default_literal(&kind, raw))
                }
            },
        };

        let is_phi = inputs
            .values
            .get(InputName::IsPhi.as_str())
            .is_some_and(|values| !values.iter().any(|v| v.trim().eq_ignore_ascii_case("false")));

        Ok(Self {
            description: inputs.get(InputName::FieldDesc).map(str::to_string),
            units: inputs.get(InputName::Units).map(str::to_string),
            name,
            kind,
            allowed_missing,
            default,
            is_phi,
        })
    }

    /// The companion field recording this field's units, if it has any.
    pub fn units_field(&self) -> Option<FormField> {
        let units = self.units.as_ref()?;
        Some(FormField {
            name: units_field_name(&self.name),
            kind: FieldKind::Categorical {
                values: vec![units.clone()],
            },
            description: None,
            allowed_missing: Vec::new(),
            default: Some(Literal::text(units.clone())),
            units: None,
            is_phi: false,
        })
    }
}

/// Categorical values arrive one per line; blanks are dropped.
fn split_categories(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_bound(
    inputs: &Inputs<'_>,
    data_type: FieldType,
    value_input: InputName,
    comparison_input: InputName,
) -> Result<Option<Bound>> {
    let Some(raw) = inputs.get(value_input) else {
        return Ok(None);
    };
    let comparison = inputs.require(comparison_input)?;
    let key: ValidationKey = comparison
        .parse()
        .map_err(|_| inputs.invalid(comparison_input, comparison))?;
    let permitted = match value_input {
        InputName::MinimumValue => [ValidationKey::MinInclusive, ValidationKey::MinExclusive],
        _ => [ValidationKey::MaxInclusive, ValidationKey::MaxExclusive],
    };
    if !permitted.contains(&key) {
        return Err(inputs.invalid(comparison_input, comparison));
    }
    let value = typed_literal(data_type, raw).ok_or_else(|| inputs.invalid(value_input, raw))?;
    Ok(Some(Bound { key, value }))
}

/// Parse a raw input as a literal of `data_type`; `None` if a numeric type
/// receives something that is not a finite number.
fn typed_literal(data_type: FieldType, raw: &str) -> Option<Literal> {
    match data_type {
        FieldType::Integer | FieldType::Decimal => {
            raw.parse::<i64>().map(Literal::Integer).ok().or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(Literal::Decimal)
            })
        }
        FieldType::Text | FieldType::DateTime => Some(Literal::text(raw)),
    }
}

fn default_literal(kind: &FieldKind, raw: &str) -> Literal {
    if let Some(missing) = MissingValue::from_input_name(raw) {
        return Literal::text(missing.as_str());
    }
    match kind {
        FieldKind::Continuous { data_type, .. } => {
            typed_literal(*data_type, raw).unwrap_or_else(|| Literal::text(raw))
        }
        _ => Literal::text(raw),
    }
}

/// Turns form fields into schema nodes.
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'a> {
    catalog: &'a RegexCatalog,
    rules: FieldNameRules,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(catalog: &'a RegexCatalog) -> Self {
        Self {
            catalog,
            rules: FieldNameRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: FieldNameRules) -> Self {
        self.rules = rules;
        self
    }

    /// Schemas for one form field: the units companion first when there is
    /// one, then the field itself.
    pub fn build(&self, field: &FormField) -> Result<Vec<(String, SchemaNode)>> {
        self.rules.check(&field.name)?;
        let mut built = Vec::with_capacity(2);
        let mut node = self.field_node(field);
        if let Some(units_field) = field.units_field() {
            let units_node = self.field_node(&units_field);
            node.units = Some(units_field.name.clone());
            built.push((units_field.name, units_node));
        }
        debug!(field = %field.name, "built field schema");
        built.push((field.name.clone(), node));
        Ok(built)
    }

    pub fn build_all<'f, I>(&self, fields: I) -> Result<FieldSchemas>
    where
        I: IntoIterator<Item = &'f FormField>,
    {
        let mut schemas = FieldSchemas::new();
        for field in fields {
            schemas.extend(self.build(field)?);
        }
        Ok(schemas)
    }

    fn field_node(&self, field: &FormField) -> SchemaNode {
        let mut top = SchemaNode::new()
            .with_empty(false)
            .with_required(true)
            .with_phi(field.is_phi);
        top.field_desc.clone_from(&field.description);

        let validation = self.validation_node(&field.kind);
        if field.allowed_missing.is_empty() {
            top = top.overlaid_with(&validation);
        } else {
            let missing = self
                .typed_node(FieldType::Text)
                .with_allowed(field.allowed_missing.iter().map(MissingValue::as_str));
            top.anyof = Some(vec![missing, validation]);
        }
        top.default.clone_from(&field.default);
        top
    }

    fn validation_node(&self, kind: &FieldKind) -> SchemaNode {
        match kind {
            FieldKind::Text => self.typed_node(FieldType::Text),
            FieldKind::Boolean {
                true_label,
                false_label,
            } => self
                .typed_node(FieldType::Text)
                .with_allowed([true_label.as_str(), false_label.as_str()]),
            FieldKind::Categorical { values } => self
                .typed_node(FieldType::Text)
                .with_allowed(values.iter().map(String::as_str)),
            FieldKind::Continuous {
                data_type,
                minimum,
                maximum,
            } => {
                let mut node = self.typed_node(*data_type);
                for bound in [minimum, maximum].into_iter().flatten() {
                    let value = Some(bound.value.clone());
                    match bound.key {
                        ValidationKey::MinInclusive => node.min = value,
                        ValidationKey::MinExclusive => node.min_exclusive = value,
                        ValidationKey::MaxInclusive => node.max = value,
                        _ => node.max_exclusive = value,
                    }
                }
                node
            }
        }
    }

    /// A node of the given type, with the catalog's format for that type
    /// when one is registered.
    fn typed_node(&self, field_type: FieldType) -> SchemaNode {
        let node = SchemaNode::typed(field_type);
        match self.catalog.pattern_for_type(field_type) {
            Some(pattern) => node.with_regex(pattern),
            None => node,
        }
    }
}

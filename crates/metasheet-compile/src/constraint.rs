//! Constraint compilation.
//!
//! A single traversal produces either the validation formula or its
//! natural-language description, selected by [`OutputMode`], so both outputs
//! always cover the same constraints.
//!
//! Per node: the `anyof` children are compiled (inheriting the node's type)
//! and OR-ed; the node's own keys are compiled and AND-ed; the two results
//! are AND-ed together.

use metasheet_catalog::RegexCatalog;
use metasheet_model::{FieldType, Literal, SchemaNode};
use serde::Serialize;

use crate::comparison::Comparison;
use crate::datetime::{self, DatetimeThreshold};
use crate::error::{CompileError, Result};
use crate::logic::{Connective, combine, quote};
use crate::types::{TypeCheck, declared_type};

/// Deepest `anyof` nesting accepted before compilation gives up.
pub const MAX_NESTING: usize = 16;

/// Which artifact a traversal produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Formula,
    Description,
}

/// Formula and description compiled for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledConstraint {
    /// Boolean formula over `{cell}` (and `{col_range}` for uniqueness),
    /// or `None` when the field is unconstrained.
    pub formula: Option<String>,
    /// Lower-case clause list, e.g. "must equal one of ...". Empty when unconstrained.
    pub description: String,
}

/// Type and blank-cell policy passed from a node to its `anyof` children.
#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    field_type: Option<FieldType>,
    required: Option<bool>,
    empty: Option<bool>,
}

impl Inherited {
    fn descend(self, node: &SchemaNode, own_type: Option<FieldType>) -> Self {
        Self {
            field_type: own_type.or(self.field_type),
            required: node.required.or(self.required),
            empty: node.empty.or(self.empty),
        }
    }

    fn policy_is_explicit(&self) -> bool {
        self.required.is_some() || self.empty.is_some()
    }

    /// `empty` wins when set; otherwise a blank is valid unless required.
    fn blank_is_valid(&self) -> bool {
        match (self.empty, self.required) {
            (Some(empty), _) => empty,
            (None, Some(required)) => !required,
            (None, None) => true,
        }
    }
}

/// Compiles Schema Nodes against a format catalog.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintCompiler<'a> {
    catalog: &'a RegexCatalog,
}

impl<'a> ConstraintCompiler<'a> {
    pub fn new(catalog: &'a RegexCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a RegexCatalog {
        self.catalog
    }

    pub fn compile_formula(
        &self,
        node: &SchemaNode,
        inherited_type: Option<FieldType>,
    ) -> Result<Option<String>> {
        self.compile(node, OutputMode::Formula, inherited_type)
    }

    pub fn compile_description(
        &self,
        node: &SchemaNode,
        inherited_type: Option<FieldType>,
    ) -> Result<Option<String>> {
        self.compile(node, OutputMode::Description, inherited_type)
    }

    /// Both artifacts for a top-level field.
    pub fn compile_constraint(&self, node: &SchemaNode) -> Result<CompiledConstraint> {
        Ok(CompiledConstraint {
            formula: self.compile_formula(node, None)?,
            description: self.compile_description(node, None)?.unwrap_or_default(),
        })
    }

    pub fn compile(
        &self,
        node: &SchemaNode,
        mode: OutputMode,
        inherited_type: Option<FieldType>,
    ) -> Result<Option<String>> {
        let inherited = Inherited {
            field_type: inherited_type,
            ..Inherited::default()
        };
        self.visit(node, mode, inherited, 0)
    }

    fn visit(
        &self,
        node: &SchemaNode,
        mode: OutputMode,
        inherited: Inherited,
        depth: usize,
    ) -> Result<Option<String>> {
        if depth > MAX_NESTING {
            return Err(CompileError::NestingTooDeep { limit: MAX_NESTING });
        }
        let own_type = declared_type(node)?;
        let context = inherited.descend(node, own_type);

        let mut parts = Vec::new();
        if let Some(children) = &node.anyof {
            let mut alternatives = Vec::new();
            for child in children {
                if let Some(part) = self.visit(child, mode, context, depth + 1)? {
                    alternatives.push(part);
                }
            }
            parts.extend(combine(alternatives, Connective::Or, mode));
        }
        parts.extend(self.own_level(node, mode, own_type, context)?);
        Ok(combine(parts, Connective::And, mode))
    }

    /// The node's own keys AND-ed, behind the blank short-circuit when the
    /// node's type or emptiness policy is known.
    fn own_level(
        &self,
        node: &SchemaNode,
        mode: OutputMode,
        own_type: Option<FieldType>,
        context: Inherited,
    ) -> Result<Option<String>> {
        let mut parts = Vec::new();

        // children assert the type themselves when alternatives exist
        if node.anyof.is_none()
            && let Some(check) = own_type.map(TypeCheck::for_type)
        {
            let fragment = match mode {
                OutputMode::Formula => check.formula,
                OutputMode::Description => check.description,
            };
            parts.extend(fragment.map(str::to_string));
        }

        if node.unique == Some(true) {
            parts.push(match mode {
                OutputMode::Formula => "COUNTIF({col_range},{cell})=1".to_string(),
                OutputMode::Description => "must be unique".to_string(),
            });
        }

        for comparison in Comparison::ALL {
            if let Some(threshold) = node.threshold(comparison.key()) {
                parts.push(self.comparison(threshold, comparison, context.field_type, mode)?);
            }
        }

        if let Some(values) = &node.forbidden {
            parts.extend(forbidden(values, context.field_type, mode));
        }
        if let Some(values) = &node.allowed {
            parts.extend(allowed(values, context.field_type, mode));
        }

        if let Some(format) = &node.regex {
            let entry = self.catalog.require(format)?;
            parts.push(match mode {
                OutputMode::Formula => entry.formula.clone(),
                OutputMode::Description => entry.message.clone(),
            });
        }

        let inner = combine(parts, Connective::And, mode);
        if mode == OutputMode::Description {
            return Ok(inner);
        }

        let guarded = context.field_type.is_some() || context.policy_is_explicit();
        if !guarded {
            return Ok(inner);
        }
        let blank = if context.blank_is_valid() { "TRUE" } else { "FALSE" };
        Ok(match inner {
            Some(formula) => Some(format!("IF({{cell}}=\"\",{blank},{formula})")),
            // alternatives carry the policy themselves
            None if node.anyof.is_some() => None,
            None if context.blank_is_valid() => None,
            None => Some("IF({cell}=\"\",FALSE,TRUE)".to_string()),
        })
    }

    fn comparison(
        &self,
        threshold: &Literal,
        comparison: Comparison,
        field_type: Option<FieldType>,
        mode: OutputMode,
    ) -> Result<String> {
        if field_type == Some(FieldType::DateTime) {
            let parsed = DatetimeThreshold::parse(threshold, comparison, self.catalog)?;
            return Ok(match mode {
                OutputMode::Formula => datetime::comparison_formula(&parsed, comparison),
                OutputMode::Description => {
                    format!("{} {threshold}", comparison.datetime_phrase())
                }
            });
        }

        let value = threshold
            .as_f64()
            .ok_or_else(|| CompileError::InvalidThreshold {
                key: comparison.key(),
                value: threshold.to_string(),
                expected: "numeric",
            })?;
        Ok(match mode {
            OutputMode::Formula => {
                let failing = value + comparison.failing_offset() as f64;
                format!(
                    "IFERROR(VALUE({{cell}}),{failing}){}{value}",
                    comparison.operator()
                )
            }
            OutputMode::Description => format!("{} {value}", comparison.numeric_phrase()),
        })
    }
}

/// Render a list value for a formula.
///
/// Text and date/time fields compare against strings; numeric fields
/// against bare numbers unless the value itself is not numeric.
pub(crate) fn formula_literal(value: &Literal, field_type: Option<FieldType>) -> String {
    let bare = match (field_type, value) {
        (Some(field_type), _) if field_type.quotes_literals() => false,
        (Some(_), value) => value.is_numeric(),
        (None, Literal::Integer(_) | Literal::Decimal(_)) => value.is_numeric(),
        (None, Literal::Bool(_)) => true,
        (None, Literal::Text(_)) => false,
    };
    match value {
        Literal::Bool(flag) if bare => if *flag { "TRUE" } else { "FALSE" }.to_string(),
        _ if bare => value.to_string(),
        _ => quote(&value.to_string()),
    }
}

/// Text values are shown in quotes unless the field reads them as numbers.
fn description_list(values: &[Literal], field_type: Option<FieldType>) -> String {
    let numeric_field = field_type.is_some_and(|field_type| field_type.is_numeric());
    values
        .iter()
        .map(|value| match value {
            Literal::Text(text) if !(numeric_field && value.is_numeric()) => format!("\"{text}\""),
            _ => value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn allowed(values: &[Literal], field_type: Option<FieldType>, mode: OutputMode) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    match mode {
        OutputMode::Formula => combine(
            values
                .iter()
                .map(|value| format!("EXACT({{cell}},{})", formula_literal(value, field_type)))
                .collect(),
            Connective::Or,
            mode,
        ),
        OutputMode::Description if values.len() == 1 => Some(format!(
            "must equal {}",
            description_list(values, field_type)
        )),
        OutputMode::Description => Some(format!(
            "must equal one of {}",
            description_list(values, field_type)
        )),
    }
}

fn forbidden(
    values: &[Literal],
    field_type: Option<FieldType>,
    mode: OutputMode,
) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    match mode {
        OutputMode::Formula => combine(
            values
                .iter()
                .map(|value| format!("{{cell}}<>{}", formula_literal(value, field_type)))
                .collect(),
            Connective::And,
            mode,
        ),
        OutputMode::Description if values.len() == 1 => Some(format!(
            "must not equal {}",
            description_list(values, field_type)
        )),
        OutputMode::Description => Some(format!(
            "must not equal any of {}",
            description_list(values, field_type)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metasheet_model::ValidationKey;

    fn catalog() -> RegexCatalog {
        RegexCatalog::builtin().unwrap()
    }

    #[test]
    fn lone_allowed_list_is_not_wrapped() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::new().with_allowed(["a", "b"]);
        assert_eq!(
            compiler.compile_formula(&node, None).unwrap().as_deref(),
            Some(r#"OR(EXACT({cell},"a"),EXACT({cell},"b"))"#)
        );
    }

    #[test]
    fn typed_field_is_guarded() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::typed(FieldType::Integer)
            .with_min(18)
            .with_required(true)
            .with_empty(false);
        assert_eq!(
            compiler.compile_formula(&node, None).unwrap().as_deref(),
            Some(
                r#"IF({cell}="",FALSE,AND(IFERROR(INT(VALUE({cell}))=VALUE({cell}),FALSE),IFERROR(VALUE({cell}),17)>=18))"#
            )
        );
    }

    #[test]
    fn plain_text_field_is_unconstrained() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let constraint = compiler
            .compile_constraint(&SchemaNode::typed(FieldType::Text))
            .unwrap();
        assert_eq!(constraint.formula, None);
        assert_eq!(constraint.description, "");
    }

    #[test]
    fn required_text_rejects_blank_only() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::typed(FieldType::Text).with_required(true);
        assert_eq!(
            compiler.compile_formula(&node, None).unwrap().as_deref(),
            Some(r#"IF({cell}="",FALSE,TRUE)"#)
        );
    }

    #[test]
    fn inherited_type_sets_quoting() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::new().with_forbidden(["9606"]);
        assert_eq!(
            compiler
                .compile_formula(&node, Some(FieldType::Integer))
                .unwrap()
                .as_deref(),
            Some(r#"IF({cell}="",TRUE,{cell}<>9606)"#)
        );
        assert_eq!(
            compiler.compile_formula(&node, None).unwrap().as_deref(),
            Some(r#"{cell}<>"9606""#)
        );
    }

    #[test]
    fn non_numeric_threshold_is_rejected() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::typed(FieldType::Integer).with_max("lots");
        let err = compiler.compile_formula(&node, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "max threshold lots is not a valid numeric value"
        );
    }

    #[test]
    fn infinite_threshold_is_rejected() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::typed(FieldType::Decimal).with_min("inf");
        let err = compiler.compile_formula(&node, None).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidThreshold {
                key: ValidationKey::MinInclusive,
                ..
            }
        ));
    }

    #[test]
    fn nan_in_numeric_allow_list_is_quoted() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::typed(FieldType::Integer).with_allowed(["NaN", "1"]);
        let formula = compiler.compile_formula(&node, None).unwrap().unwrap();
        assert!(formula.contains(r#"OR(EXACT({cell},"NaN"),EXACT({cell},1))"#), "{formula}");
        assert_eq!(formula_literal(&Literal::Decimal(f64::NAN), None), "\"NaN\"");
    }

    #[test]
    fn unknown_format_propagates() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let node = SchemaNode::new().with_regex("postcode");
        let err = compiler.compile_description(&node, None).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized format: postcode");
    }

    #[test]
    fn runaway_nesting_is_reported() {
        let catalog = catalog();
        let compiler = ConstraintCompiler::new(&catalog);
        let mut node = SchemaNode::new().with_allowed(["x"]);
        for _ in 0..=MAX_NESTING + 1 {
            node = SchemaNode::new().with_anyof(vec![node]);
        }
        let err = compiler.compile_formula(&node, None).unwrap_err();
        assert!(matches!(err, CompileError::NestingTooDeep { .. }));
    }

    #[test]
    fn bare_literals_per_type() {
        assert_eq!(formula_literal(&Literal::Integer(5), Some(FieldType::Text)), "\"5\"");
        assert_eq!(formula_literal(&Literal::text("5"), Some(FieldType::Decimal)), "5");
        assert_eq!(
            formula_literal(&Literal::text("not provided"), Some(FieldType::Decimal)),
            "\"not provided\""
        );
        assert_eq!(formula_literal(&Literal::Bool(true), None), "TRUE");
        assert_eq!(formula_literal(&Literal::Bool(true), Some(FieldType::Text)), "\"true\"");
    }
}

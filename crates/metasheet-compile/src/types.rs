//! Field type resolution: declared type name to comparison semantics,
//! well-typedness formula fragment, and descriptive phrase.

use metasheet_model::{FieldType, SchemaNode};

use crate::error::{CompileError, Result};

/// Well-typedness check for one declared type.
///
/// The formula fragment assumes the cell is non-blank; callers wrap it in a
/// blank short-circuit that applies the field's emptiness policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCheck {
    pub field_type: FieldType,
    pub formula: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl TypeCheck {
    pub fn for_type(field_type: FieldType) -> Self {
        let (formula, description) = match field_type {
            // INT and VALUE both raise on non-numeric text, hence the IFERROR
            FieldType::Integer => (
                Some("IFERROR(INT(VALUE({cell}))=VALUE({cell}),FALSE)"),
                Some("the value must be an integer"),
            ),
            FieldType::Decimal => (
                Some("ISNUMBER(VALUE({cell}))"),
                Some("the value must be a decimal number"),
            ),
            // any text is well-typed; date/time shape is a format constraint
            FieldType::Text | FieldType::DateTime => (None, None),
        };
        Self {
            field_type,
            formula,
            description,
        }
    }
}

/// Parse the node's own declared type, if any.
pub fn declared_type(node: &SchemaNode) -> Result<Option<FieldType>> {
    node.data_type
        .as_deref()
        .map(|name| {
            name.parse::<FieldType>()
                .map_err(|_| CompileError::UnrecognizedType {
                    name: name.to_string(),
                })
        })
        .transpose()
}

/// Resolve the node's own declared type into its check. Returns `None` when
/// the node leaves its type to an enclosing alternative.
pub fn resolve(node: &SchemaNode) -> Result<Option<TypeCheck>> {
    Ok(declared_type(node)?.map(TypeCheck::for_type))
}

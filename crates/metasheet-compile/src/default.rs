//! Default-fill formulas.
//!
//! A default is written only once the row's trigger cell holds something,
//! so an untouched sheet is not pre-filled with defaults.

use metasheet_model::{FieldType, Literal, SchemaNode};

use crate::constraint::MAX_NESTING;
use crate::error::{CompileError, Result};
use crate::logic::quote;
use crate::types::declared_type;

/// The first default reachable through `anyof`, in list order.
pub fn find_default(node: &SchemaNode) -> Option<&Literal> {
    if let Some(value) = &node.default {
        return Some(value);
    }
    node.alternatives().iter().find_map(find_default)
}

/// Compile the default-fill formula for a field.
///
/// The result references `{row}`, the per-row index substituted by the
/// caller; `trigger_column` is the column letter of the trigger cell.
pub fn compile_default(node: &SchemaNode, trigger_column: &str) -> Result<Option<String>> {
    let Some(literal) = default_literal(node, None, 0)? else {
        return Ok(None);
    };
    Ok(Some(format!(
        "=IF({trigger_column}{{row}}=\"\",\"\",{literal})"
    )))
}

/// The default rendered as a formula literal, first match wins.
fn default_literal(
    node: &SchemaNode,
    inherited: Option<FieldType>,
    depth: usize,
) -> Result<Option<String>> {
    if depth > MAX_NESTING {
        return Err(CompileError::NestingTooDeep { limit: MAX_NESTING });
    }
    let own_type = declared_type(node)?.or(inherited);
    if let Some(value) = &node.default {
        let field_type = default_type(node, value, own_type)?;
        return render(value, field_type).map(Some);
    }
    for child in node.alternatives() {
        if let Some(literal) = default_literal(child, own_type, depth + 1)? {
            return Ok(Some(literal));
        }
    }
    Ok(None)
}

/// Type the default literal is written as.
///
/// Looks one level into `anyof`: the branch whose allowed list holds the
/// default decides, otherwise the last branch does.
fn default_type(
    node: &SchemaNode,
    value: &Literal,
    own_type: Option<FieldType>,
) -> Result<Option<FieldType>> {
    let branches: Vec<(Option<FieldType>, Option<&[Literal]>)> = match &node.anyof {
        Some(children) => {
            if children.len() > 2 {
                return Err(CompileError::TooManyAlternatives {
                    found: children.len(),
                });
            }
            children
                .iter()
                .map(|child| Ok((declared_type(child)?.or(own_type), child.allowed.as_deref())))
                .collect::<Result<_>>()?
        }
        None => vec![(own_type, node.allowed.as_deref())],
    };

    let mut types: Vec<FieldType> = branches.iter().filter_map(|(t, _)| *t).collect();
    types.dedup();
    if types.len() > 1 && !types.contains(&FieldType::Text) {
        return Err(CompileError::IncompatibleTypes {
            types: types
                .iter()
                .map(FieldType::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let mut chosen = own_type;
    for (field_type, allowed) in branches {
        chosen = field_type;
        if allowed.is_some_and(|allowed| allowed.iter().any(|item| item.same_value(value))) {
            break;
        }
    }
    Ok(chosen)
}

fn render(value: &Literal, field_type: Option<FieldType>) -> Result<String> {
    match field_type {
        Some(field_type) if field_type.quotes_literals() => Ok(quote(&value.to_string())),
        Some(field_type) => match value.as_f64() {
            Some(_) => Ok(value.to_string()),
            None => Err(CompileError::DefaultTypeMismatch {
                value: value.to_string(),
                field_type,
            }),
        },
        None => Ok(match value {
            Literal::Text(text) => quote(text),
            Literal::Bool(true) => "TRUE".to_string(),
            Literal::Bool(false) => "FALSE".to_string(),
            other => other.to_string(),
        }),
    }
}

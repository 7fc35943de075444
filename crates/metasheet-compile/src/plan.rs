//! Choice of spreadsheet data-validation rule for a field.

use metasheet_catalog::RegexCatalog;
use metasheet_model::SchemaNode;
use serde::Serialize;
use tracing::debug;

use crate::constraint::ConstraintCompiler;
use crate::describe::describe_field;
use crate::error::Result;
use crate::rollup::roll_up_allowed;

/// Longest comma-joined list a list validation accepts.
pub const LIST_SOURCE_LIMIT: usize = 255;
/// Longest input/error title.
pub const TITLE_LIMIT: usize = 32;
/// Longest input/error message.
pub const MESSAGE_LIMIT: usize = 255;

const TRUNCATION_NOTICE: &str =
    "[text truncated: please refer to field descriptions sheet for full requirements].";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationKind {
    /// Native drop-down over the rolled-up allowed values.
    List { source: Vec<String> },
    /// Custom formula, `=(...)`, still holding `{cell}`/`{col_range}`.
    Custom { formula: String },
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::List { .. } => "list",
            ValidationKind::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRule {
    #[serde(flatten)]
    pub kind: ValidationKind,
    pub input_title: String,
    pub input_message: String,
    pub error_title: String,
    pub error_message: String,
}

/// Plan the data validation for one field, or `None` when the field is
/// unconstrained.
pub fn plan_validation(
    field_name: &str,
    node: &SchemaNode,
    catalog: &RegexCatalog,
) -> Result<Option<ValidationRule>> {
    let kind = match list_source(node) {
        Some(source) => ValidationKind::List { source },
        None => match ConstraintCompiler::new(catalog).compile_formula(node, None)? {
            Some(formula) => ValidationKind::Custom {
                formula: format!("=({formula})"),
            },
            None => {
                debug!(field = field_name, "no validation needed");
                return Ok(None);
            }
        },
    };
    debug!(field = field_name, kind = kind.as_str(), "planned validation");

    let message = describe_field(node, catalog)?;
    Ok(Some(ValidationRule {
        kind,
        input_title: title("Enter ", field_name),
        input_message: truncate_message(message.clone()),
        error_title: title("Invalid ", field_name),
        error_message: truncate_message(format!(
            "The {field_name} value entered is not valid. {message}"
        )),
    }))
}

/// Rolled-up values for a drop-down. The list source is comma-separated, so a
/// value containing a comma forces a custom formula.
fn list_source(node: &SchemaNode) -> Option<Vec<String>> {
    let values = roll_up_allowed(node)?;
    let source: Vec<String> = values.iter().map(ToString::to_string).collect();
    let fits = !source.is_empty()
        && source.iter().all(|value| !value.contains(','))
        && source.join(",").chars().count() <= LIST_SOURCE_LIMIT;
    fits.then_some(source)
}

fn title(prefix: &str, field_name: &str) -> String {
    let usable = TITLE_LIMIT - prefix.chars().count();
    if field_name.chars().count() > usable {
        format!("{prefix}value")
    } else {
        format!("{prefix}{field_name}")
    }
}

fn truncate_message(message: String) -> String {
    if message.chars().count() <= MESSAGE_LIMIT {
        return message;
    }
    let usable = MESSAGE_LIMIT - TRUNCATION_NOTICE.chars().count();
    let mut truncated: String = message.chars().take(usable).collect();
    truncated.push_str(TRUNCATION_NOTICE);
    truncated
}

use metasheet_catalog::RegexCatalog;
use metasheet_model::SchemaNode;

use crate::constraint::ConstraintCompiler;
use crate::default::find_default;
use crate::error::Result;

/// Full guidance text for a field: its free-text description, the compiled
/// constraint description, and its default, each as a capitalised sentence.
pub fn describe_field(node: &SchemaNode, catalog: &RegexCatalog) -> Result<String> {
    let mut sentences = Vec::new();
    if let Some(field_desc) = node.field_desc.as_deref().map(str::trim)
        && !field_desc.is_empty()
    {
        sentences.push(sentence(field_desc));
    }
    if let Some(constraint) = ConstraintCompiler::new(catalog).compile_description(node, None)? {
        sentences.push(sentence(&constraint));
    }
    if let Some(default) = find_default(node) {
        sentences.push(sentence(&format!("the default value is {default}")));
    }
    Ok(sentences.join(" "))
}

/// Capitalise the first letter, leaving the rest untouched, and end with a period.
fn sentence(text: &str) -> String {
    let mut chars = text.chars();
    let mut result: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if !result.ends_with('.') {
        result.push('.');
    }
    result
}

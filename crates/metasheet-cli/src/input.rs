//! Loading command inputs from disk.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use metasheet_catalog::RegexCatalog;
use metasheet_model::FieldSchemas;
use metasheet_schema::{FormEntry, FormField};

/// Load a catalog file, or the built-in catalog when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<RegexCatalog> {
    match path {
        Some(path) => RegexCatalog::load(path)
            .with_context(|| format!("load regex catalog {}", path.display())),
        None => RegexCatalog::builtin().context("load built-in regex catalog"),
    }
}

/// Field schemas stored as a JSON object of field name to schema node.
pub fn load_field_schemas(path: &Path) -> Result<FieldSchemas> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parse field schemas {}", path.display()))
}

/// Form submissions stored as a JSON array, one object per field.
pub fn load_form_fields(path: &Path) -> Result<Vec<FormField>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let forms: Vec<BTreeMap<String, FormEntry>> = serde_json::from_str(&contents)
        .with_context(|| format!("parse form fields {}", path.display()))?;
    forms
        .iter()
        .enumerate()
        .map(|(position, entries)| {
            FormField::from_entries(entries)
                .with_context(|| format!("read form field {}", position + 1))
        })
        .collect()
}

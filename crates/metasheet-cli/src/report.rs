//! Per-field compilation results and their serialized forms.

use std::io::Write;

use anyhow::{Context, Result};
use metasheet_catalog::RegexCatalog;
use metasheet_compile::{
    ConstraintCompiler, ValidationRule, compile_default, describe_field, plan_validation,
};
use metasheet_model::FieldSchemas;
use serde::Serialize;
use tracing::debug;

/// Everything compiled for one field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub formula: Option<String>,
    pub description: Option<String>,
    pub default_formula: Option<String>,
    pub validation: Option<ValidationRule>,
}

/// One row of the field-descriptions reference sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionRow {
    pub field_name: String,
    pub field_description: String,
}

/// Compile every field, in field-name order.
pub fn compile_fields(
    schemas: &FieldSchemas,
    catalog: &RegexCatalog,
    trigger_column: &str,
) -> Result<Vec<FieldReport>> {
    let compiler = ConstraintCompiler::new(catalog);
    schemas
        .iter()
        .map(|(field, node)| {
            let compiled = compiler
                .compile_constraint(node)
                .with_context(|| format!("compile field {field}"))?;
            let default_formula = compile_default(node, trigger_column)
                .with_context(|| format!("compile default for field {field}"))?;
            let validation = plan_validation(field, node, catalog)
                .with_context(|| format!("plan validation for field {field}"))?;
            debug!(field = %field, "compiled field");
            Ok(FieldReport {
                field: field.clone(),
                formula: compiled.formula,
                description: Some(compiled.description).filter(|text| !text.is_empty()),
                default_formula,
                validation,
            })
        })
        .collect()
}

pub fn description_rows(
    schemas: &FieldSchemas,
    catalog: &RegexCatalog,
) -> Result<Vec<DescriptionRow>> {
    schemas
        .iter()
        .map(|(field, node)| {
            let field_description = describe_field(node, catalog)
                .with_context(|| format!("describe field {field}"))?;
            Ok(DescriptionRow {
                field_name: field.clone(),
                field_description,
            })
        })
        .collect()
}

pub fn write_descriptions_csv<W: Write>(rows: &[DescriptionRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row).context("write description row")?;
    }
    csv.flush().context("flush description rows")?;
    Ok(())
}

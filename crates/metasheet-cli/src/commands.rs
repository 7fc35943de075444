use std::io;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use metasheet_cli::input::{load_catalog, load_field_schemas, load_form_fields};
use metasheet_cli::report::{compile_fields, description_rows, write_descriptions_csv};
use metasheet_schema::{FieldNameRules, PackageRegistry, SchemaBuilder, rewrite_phi_field_names};

use crate::cli::{
    BuildArgs, CatalogArgs, CompileArgs, DescribeArgs, DescribeFormatArg, PackageArgs,
    ReportFormatArg,
};
use crate::summary::{print_catalog, print_combinations, print_descriptions, print_field_reports};

pub fn run_compile(args: &CompileArgs) -> Result<()> {
    let span = info_span!("compile", schema = %args.schema.display());
    let _guard = span.enter();
    let catalog = load_catalog(args.catalog.as_deref())?;
    let schemas = load_field_schemas(&args.schema)?;
    let reports = compile_fields(&schemas, &catalog, &args.trigger_column)?;
    info!(fields = reports.len(), "compiled field schemas");
    match args.format {
        ReportFormatArg::Table => print_field_reports(&reports),
        ReportFormatArg::Json => print_json(&reports)?,
    }
    Ok(())
}

pub fn run_describe(args: &DescribeArgs) -> Result<()> {
    let span = info_span!("describe", schema = %args.schema.display());
    let _guard = span.enter();
    let catalog = load_catalog(args.catalog.as_deref())?;
    let schemas = load_field_schemas(&args.schema)?;
    let rows = description_rows(&schemas, &catalog)?;
    info!(fields = rows.len(), "described field schemas");
    match args.format {
        DescribeFormatArg::Table => print_descriptions(&rows),
        DescribeFormatArg::Csv => write_descriptions_csv(&rows, io::stdout().lock())?,
        DescribeFormatArg::Json => print_json(&rows)?,
    }
    Ok(())
}

pub fn run_package(args: &PackageArgs) -> Result<()> {
    let span = info_span!("package", packages = %args.packages.display());
    let _guard = span.enter();
    let registry = PackageRegistry::load(&args.packages)
        .with_context(|| format!("load package definitions {}", args.packages.display()))?;
    match (&args.environment, &args.sample_type) {
        (Some(environment), Some(sample_type)) => {
            let schemas = registry
                .schema_for(environment, sample_type)
                .with_context(|| format!("assemble {environment} {sample_type}"))?;
            info!(fields = schemas.len(), %environment, %sample_type, "assembled package schema");
            print_json(&schemas)?;
        }
        _ => {
            let combinations = registry.combinations();
            info!(combinations = combinations.len(), "listed package combinations");
            print_combinations(&combinations);
        }
    }
    Ok(())
}

pub fn run_build(args: &BuildArgs) -> Result<()> {
    let span = info_span!("build", forms = %args.forms.display());
    let _guard = span.enter();
    let catalog = load_catalog(args.catalog.as_deref())?;
    let fields = load_form_fields(&args.forms)?;
    let mut builder = SchemaBuilder::new(&catalog);
    if !args.reserved.is_empty() {
        builder = builder
            .with_rules(FieldNameRules::default().with_reserved(args.reserved.iter().cloned()));
    }
    let mut schemas = builder.build_all(&fields).context("build field schemas")?;
    if !args.keep_phi_names {
        schemas = rewrite_phi_field_names(schemas);
    }
    info!(fields = schemas.len(), "built field schemas");
    print_json(&schemas)
}

pub fn run_catalog(args: &CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    print_catalog(&catalog);
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

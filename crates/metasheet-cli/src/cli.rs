//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "metasheet",
    version,
    about = "Compile field schemas into spreadsheet validation formulas",
    long_about = "Compile Cerberus-style field schemas into spreadsheet validation.\n\n\
                  Produces boolean validation formulas, plain-language field guidance,\n\
                  and default-fill formulas, and assembles schemas from package\n\
                  definitions or form submissions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile each field's formula, description, default and validation plan.
    Compile(CompileArgs),

    /// Produce the field-descriptions reference sheet.
    Describe(DescribeArgs),

    /// Assemble field schemas from package definitions.
    Package(PackageArgs),

    /// Build field schemas from form submissions.
    Build(BuildArgs),

    /// List the formats registered in a regex catalog.
    Catalog(CatalogArgs),
}

#[derive(Parser)]
pub struct CompileArgs {
    /// JSON file mapping field names to schema nodes.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Regex catalog (TOML or JSON). Defaults to the built-in catalog.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Column letter of the cell whose content triggers default filling.
    #[arg(long = "trigger-column", value_name = "COLUMN", default_value = "A")]
    pub trigger_column: String,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// JSON file mapping field names to schema nodes.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Regex catalog (TOML or JSON). Defaults to the built-in catalog.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: DescribeFormatArg,
}

#[derive(Parser)]
pub struct PackageArgs {
    /// JSON package definitions.
    #[arg(value_name = "PACKAGES")]
    pub packages: PathBuf,

    /// Environment to assemble; lists available combinations when omitted.
    #[arg(long = "env", value_name = "ENV", requires = "sample_type")]
    pub environment: Option<String>,

    #[arg(long = "sample-type", value_name = "SAMPLE_TYPE", requires = "environment")]
    pub sample_type: Option<String>,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// JSON array of form submissions, one object per field.
    #[arg(value_name = "FORMS")]
    pub forms: PathBuf,

    /// Regex catalog (TOML or JSON). Defaults to the built-in catalog.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Additional reserved field names.
    #[arg(long = "reserved", value_name = "NAME")]
    pub reserved: Vec<String>,

    /// Keep PHI field names as entered instead of appending `_phi`.
    #[arg(long = "keep-phi-names")]
    pub keep_phi_names: bool,
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Regex catalog (TOML or JSON). Defaults to the built-in catalog.
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DescribeFormatArg {
    Table,
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

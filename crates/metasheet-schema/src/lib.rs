#![deny(unsafe_code)]

//! Assembling field schemas: group-aware merges, package stacking and
//! form-driven field definitions.

pub mod error;
pub mod form;
pub mod merge;
pub mod names;
pub mod package;

pub use crate::error::{Result, SchemaError};
pub use crate::form::{Bound, FieldKind, FormEntry, FormField, InputName, SchemaBuilder};
pub use crate::merge::{MergeOptions, merge_schemas};
pub use crate::names::{
    FieldNameRules, PHI_SUFFIX, UNITS_SUFFIX, rewrite_phi_field_names, units_field_name,
};
pub use crate::package::{
    Combination, Environment, EnvironmentDefinition, PackageDefinitions, PackageRegistry,
    SampleType, single_entry,
};

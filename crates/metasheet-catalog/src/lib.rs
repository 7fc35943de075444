#![deny(unsafe_code)]

pub mod catalog;
pub mod error;

pub use crate::catalog::{
    CELL_PLACEHOLDER, DATETIME_FORMAT, DatetimeComponents, DatetimeFormat, FormatDefinition,
    FormatEntry, RegexCatalog,
};
pub use crate::error::CatalogError;

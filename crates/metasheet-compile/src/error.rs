use metasheet_catalog::CatalogError;
use metasheet_model::{FieldType, ValidationKey};

pub type Result<T> = std::result::Result<T, CompileError>;

/// Schema configuration errors raised while compiling a field.
///
/// None of these describe bad cell data; they mean the schema itself cannot
/// be turned into a formula.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unrecognized field type: {name}")]
    UnrecognizedType { name: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{key} threshold {value} is not a valid {expected} value")]
    InvalidThreshold {
        key: ValidationKey,
        value: String,
        expected: &'static str,
    },

    #[error("datetime comparison requires a datetime format in the catalog")]
    MissingDatetimeFormat,

    #[error("default type resolution supports at most two anyof alternatives, found {found}")]
    TooManyAlternatives { found: usize },

    #[error("anyof alternatives typed {types} cannot share a default unless one is text")]
    IncompatibleTypes { types: String },

    #[error("default value {value} is not a valid {field_type} literal")]
    DefaultTypeMismatch { value: String, field_type: FieldType },

    #[error("anyof nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown environment: {name}")]
    UnknownEnvironment { name: String },

    #[error("unknown sample type: {name}")]
    UnknownSampleType { name: String },

    #[error("duplicate environment: {name}")]
    DuplicateEnvironment { name: String },

    #[error("environment {name} has unknown parent {parent}")]
    UnknownParent { name: String, parent: String },

    #[error("environment parents form a cycle through {name}")]
    ParentCycle { name: String },

    #[error("{context} entry is mis-structured; must have exactly one top-level key (found {found})")]
    Misstructured { context: &'static str, found: usize },

    #[error("invalid field name {name}: must start with a lowercase letter and contain only lowercase letters, digits and underscores")]
    InvalidFieldName { name: String },

    #[error("field name {name} is reserved")]
    ReservedFieldName { name: String },

    #[error("field {field} is missing form input {input}")]
    MissingFormValue { field: String, input: &'static str },

    #[error("field {field} has invalid {input} value: {value}")]
    InvalidFormValue {
        field: String,
        input: &'static str,
        value: String,
    },

    #[error("unknown missing value: {name}")]
    UnknownMissingValue { name: String },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

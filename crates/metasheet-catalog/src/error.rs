use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML catalog {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported catalog file extension: {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("invalid pattern for format {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("formula template for format {name} does not reference {{cell}}")]
    InvalidTemplate { name: String },

    #[error("duplicate format name: {name}")]
    DuplicateFormat { name: String },

    #[error("datetime pattern must capture year, month, day, hour, minute and second (found {found} groups)")]
    MissingDatetimeGroups { found: usize },

    #[error("unrecognized format: {value}")]
    UnrecognizedFormat { value: String },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

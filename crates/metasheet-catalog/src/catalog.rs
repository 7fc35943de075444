use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use metasheet_model::FieldType;

use crate::error::CatalogError;

/// Placeholder every formula template must reference.
pub const CELL_PLACEHOLDER: &str = "{cell}";

/// Name of the entry used to decompose date/time values.
pub const DATETIME_FORMAT: &str = "datetime";

const BUILTIN_FORMATS: &str = include_str!("../data/formats.toml");

/// One catalog entry as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatDefinition {
    pub pattern: String,
    pub formula: String,
    pub message: String,
}

/// A registered format with its pattern compiled.
#[derive(Debug, Clone)]
pub struct FormatEntry {
    pub name: String,
    pub pattern: String,
    /// Formula template over [`CELL_PLACEHOLDER`].
    pub formula: String,
    /// Guidance clause, e.g. "must be a latitude in decimal degrees".
    pub message: String,
    regex: Regex,
}

impl FormatEntry {
    fn new(name: &str, definition: FormatDefinition) -> Result<Self, CatalogError> {
        let regex = Regex::new(&definition.pattern).map_err(|source| {
            CatalogError::InvalidPattern {
                name: name.to_string(),
                source,
            }
        })?;
        if !definition.formula.contains(CELL_PLACEHOLDER) {
            return Err(CatalogError::InvalidTemplate {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            pattern: definition.pattern,
            formula: definition.formula,
            message: definition.message,
            regex,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Components of a date/time value, most significant first.
///
/// `None` marks a component the value leaves out (`2008-12` has no day).
pub type DatetimeComponents = [Option<u32>; 6];

/// The datetime entry's pattern, checked to expose six capture groups
/// (year, month, day, hour, minute, second).
#[derive(Debug, Clone)]
pub struct DatetimeFormat {
    regex: Regex,
}

impl DatetimeFormat {
    fn new(regex: Regex) -> Result<Self, CatalogError> {
        // captures_len counts the implicit whole-match group
        let found = regex.captures_len().saturating_sub(1);
        if found < 6 {
            return Err(CatalogError::MissingDatetimeGroups { found });
        }
        Ok(Self { regex })
    }

    /// Splits a value into its components. Returns `None` when the value
    /// does not match the pattern or a captured component is not a number.
    pub fn components(&self, value: &str) -> Option<DatetimeComponents> {
        let captures = self.regex.captures(value.trim())?;
        let mut parts = [None; 6];
        for (index, part) in parts.iter_mut().enumerate() {
            if let Some(found) = captures.get(index + 1) {
                *part = Some(found.as_str().parse::<u32>().ok()?);
            }
        }
        Some(parts)
    }
}

/// Registry of named value formats.
///
/// Entries are looked up by name first and then by pattern text, so a
/// schema may reference a format either way.
#[derive(Debug, Clone)]
pub struct RegexCatalog {
    entries: BTreeMap<String, FormatEntry>,
    datetime: Option<DatetimeFormat>,
}

impl RegexCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse_toml(BUILTIN_FORMATS, Path::new("<builtin>"))
    }

    /// Load a catalog file, picking the parser from the extension (`.toml` or `.json`).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::parse_toml(&contents, path),
            Some("json") => Self::parse_json(&contents, path),
            _ => Err(CatalogError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        Self::parse_toml(contents, Path::new("<inline>"))
    }

    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        Self::parse_json(contents, Path::new("<inline>"))
    }

    fn parse_toml(contents: &str, path: &Path) -> Result<Self, CatalogError> {
        let definitions: BTreeMap<String, FormatDefinition> =
            toml::from_str(contents).map_err(|source| CatalogError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_definitions(definitions)
    }

    fn parse_json(contents: &str, path: &Path) -> Result<Self, CatalogError> {
        let definitions: BTreeMap<String, FormatDefinition> = serde_json::from_str(contents)
            .map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_definitions(definitions)
    }

    fn from_definitions(
        definitions: BTreeMap<String, FormatDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::empty();
        for (name, definition) in definitions {
            catalog.register(&name, definition)?;
        }
        debug!(formats = catalog.entries.len(), "loaded format catalog");
        Ok(catalog)
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            datetime: None,
        }
    }

    /// Add a format. Registering the datetime entry also refreshes the
    /// cached date/time decomposer.
    pub fn register(
        &mut self,
        name: &str,
        definition: FormatDefinition,
    ) -> Result<(), CatalogError> {
        if self.entries.contains_key(name) {
            return Err(CatalogError::DuplicateFormat {
                name: name.to_string(),
            });
        }
        let entry = FormatEntry::new(name, definition)?;
        if name == DATETIME_FORMAT {
            self.datetime = Some(DatetimeFormat::new(entry.regex.clone())?);
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    /// Find an entry by name, falling back to an entry whose pattern text
    /// equals `name_or_pattern`.
    pub fn lookup(&self, name_or_pattern: &str) -> Option<&FormatEntry> {
        self.entries.get(name_or_pattern).or_else(|| {
            self.entries
                .values()
                .find(|entry| entry.pattern == name_or_pattern)
        })
    }

    pub fn require(&self, name_or_pattern: &str) -> Result<&FormatEntry, CatalogError> {
        self.lookup(name_or_pattern)
            .ok_or_else(|| CatalogError::UnrecognizedFormat {
                value: name_or_pattern.to_string(),
            })
    }

    /// Formula template for a registered format.
    pub fn template_for(&self, name_or_pattern: &str) -> Result<&str, CatalogError> {
        self.require(name_or_pattern)
            .map(|entry| entry.formula.as_str())
    }

    /// Guidance message for a registered format.
    pub fn message_for(&self, name_or_pattern: &str) -> Result<&str, CatalogError> {
        self.require(name_or_pattern)
            .map(|entry| entry.message.as_str())
    }

    /// Pattern registered under a field type's canonical name, if any.
    pub fn pattern_for_type(&self, field_type: FieldType) -> Option<&str> {
        self.entries
            .get(field_type.as_str())
            .map(|entry| entry.pattern.as_str())
    }

    pub fn datetime(&self) -> Option<&DatetimeFormat> {
        self.datetime.as_ref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &FormatEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

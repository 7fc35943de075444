//! Environment and sample-type package registry.
//!
//! Environments form a parent chain (`base` → `human` → `human_oral`). The
//! schema for an environment and sample type is built by walking the chain
//! from the most general environment down, merging each level's own schema
//! and then its sample-type schema.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use metasheet_model::FieldSchemas;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::merge::{MergeOptions, merge_schemas};

/// Package definitions as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDefinitions {
    #[serde(default)]
    pub sample_types: Vec<SampleType>,
    #[serde(default)]
    pub environments: Vec<EnvironmentDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleType {
    pub name: String,
    pub display_name: String,
}

/// One environment entry. `sample_types` holds single-key objects mapping
/// a sample type name to its schema modifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub schema: FieldSchemas,
    #[serde(default)]
    pub sample_types: Vec<BTreeMap<String, FieldSchemas>>,
}

/// An environment after validation.
#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub display_name: String,
    pub parent: Option<String>,
    pub schema: FieldSchemas,
    pub sample_type_schemas: BTreeMap<String, FieldSchemas>,
}

/// An environment/sample-type pair a schema can be built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub environment: String,
    pub sample_type: String,
    pub display_name: String,
}

impl Combination {
    /// The `"<environment> <sample_type>"` key.
    pub fn key(&self) -> String {
        format!("{} {}", self.environment, self.sample_type)
    }
}

/// Immutable registry of environments and sample types.
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    environments: Vec<Environment>,
    index: BTreeMap<String, usize>,
    sample_types: Vec<SampleType>,
    stacks: BTreeMap<String, Vec<String>>,
}

/// The only key of a single-key object.
pub fn single_entry<'a, V>(
    map: &'a BTreeMap<String, V>,
    context: &'static str,
) -> Result<(&'a str, &'a V)> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(SchemaError::Misstructured {
            context,
            found: map.len(),
        }),
    }
}

impl PackageRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        let definitions: PackageDefinitions =
            serde_json::from_str(&contents).map_err(|source| SchemaError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_definitions(definitions)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let definitions: PackageDefinitions =
            serde_json::from_str(contents).map_err(|source| SchemaError::Json {
                path: "<inline>".into(),
                source,
            })?;
        Self::from_definitions(definitions)
    }

    pub fn from_definitions(definitions: PackageDefinitions) -> Result<Self> {
        let known_sample_types: BTreeSet<&str> = definitions
            .sample_types
            .iter()
            .map(|sample_type| sample_type.name.as_str())
            .collect();

        let mut environments = Vec::with_capacity(definitions.environments.len());
        let mut index = BTreeMap::new();
        for definition in &definitions.environments {
            if index.contains_key(&definition.name) {
                return Err(SchemaError::DuplicateEnvironment {
                    name: definition.name.clone(),
                });
            }
            let mut sample_type_schemas = BTreeMap::new();
            for entry in &definition.sample_types {
                let (sample_type, schema) = single_entry(entry, "sample type")?;
                if !known_sample_types.contains(sample_type) {
                    return Err(SchemaError::UnknownSampleType {
                        name: sample_type.to_string(),
                    });
                }
                sample_type_schemas.insert(sample_type.to_string(), schema.clone());
            }
            index.insert(definition.name.clone(), environments.len());
            environments.push(Environment {
                name: definition.name.clone(),
                display_name: definition
                    .display_name
                    .clone()
                    .unwrap_or_else(|| definition.name.clone()),
                parent: definition.parent.clone(),
                schema: definition.schema.clone(),
                sample_type_schemas,
            });
        }

        let mut registry = Self {
            environments,
            index,
            sample_types: definitions.sample_types,
            stacks: BTreeMap::new(),
        };
        let stacks = registry
            .environments
            .iter()
            .map(|env| Ok((env.name.clone(), registry.build_stack(&env.name)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        registry.stacks = stacks;
        debug!(
            environments = registry.environments.len(),
            sample_types = registry.sample_types.len(),
            "loaded package registry"
        );
        Ok(registry)
    }

    /// Walk parent links up to the root, then reverse.
    fn build_stack(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = Some(name.to_string());
        while let Some(env_name) = current {
            if !seen.insert(env_name.clone()) {
                return Err(SchemaError::ParentCycle { name: env_name });
            }
            let env = self.environment(&env_name).map_err(|_| SchemaError::UnknownParent {
                name: chain.last().cloned().unwrap_or_else(|| name.to_string()),
                parent: env_name.clone(),
            })?;
            current = env.parent.clone();
            chain.push(env_name);
        }
        chain.reverse();
        Ok(chain)
    }

    pub fn environment(&self, name: &str) -> Result<&Environment> {
        self.index
            .get(name)
            .map(|&position| &self.environments[position])
            .ok_or_else(|| SchemaError::UnknownEnvironment {
                name: name.to_string(),
            })
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn sample_types(&self) -> &[SampleType] {
        &self.sample_types
    }

    /// Environment names from the most general to `name` itself.
    pub fn parent_stack(&self, name: &str) -> Result<&[String]> {
        self.stacks
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SchemaError::UnknownEnvironment {
                name: name.to_string(),
            })
    }

    /// Merged field schemas for an environment and sample type.
    pub fn schema_for(&self, environment: &str, sample_type: &str) -> Result<FieldSchemas> {
        if !self.sample_types.iter().any(|known| known.name == sample_type) {
            return Err(SchemaError::UnknownSampleType {
                name: sample_type.to_string(),
            });
        }
        let mut schema = FieldSchemas::new();
        for name in self.parent_stack(environment)? {
            let env = self.environment(name)?;
            schema = merge_schemas(&schema, &env.schema, MergeOptions::adding());
            if let Some(modifications) = env.sample_type_schemas.get(sample_type) {
                schema = merge_schemas(&schema, modifications, MergeOptions::adding());
            }
        }
        debug!(environment, sample_type, fields = schema.len(), "assembled package schema");
        Ok(schema)
    }

    /// Every environment paired with each sample type some level of its
    /// stack defines, in sample-type listing order.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut combinations = Vec::new();
        for env in &self.environments {
            let stack = self.stacks.get(&env.name).map(Vec::as_slice).unwrap_or_default();
            let available: BTreeSet<&str> = stack
                .iter()
                .filter_map(|name| self.index.get(name))
                .flat_map(|&position| self.environments[position].sample_type_schemas.keys())
                .map(String::as_str)
                .collect();
            for sample_type in &self.sample_types {
                if available.contains(sample_type.name.as_str()) {
                    combinations.push(Combination {
                        environment: env.name.clone(),
                        sample_type: sample_type.name.clone(),
                        display_name: format!("{} {}", env.display_name, sample_type.display_name),
                    });
                }
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_requires_one_key() {
        let empty: BTreeMap<String, u8> = BTreeMap::new();
        let err = single_entry(&empty, "sample type").unwrap_err();
        assert!(matches!(err, SchemaError::Misstructured { found: 0, .. }));

        let two = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        assert!(single_entry(&two, "sample type").is_err());

        let one = BTreeMap::from([("a".to_string(), 1)]);
        assert_eq!(single_entry(&one, "sample type").unwrap(), ("a", &1));
    }

    #[test]
    fn cycles_are_rejected() {
        let definitions = PackageDefinitions {
            sample_types: Vec::new(),
            environments: vec![
                EnvironmentDefinition {
                    name: "a".to_string(),
                    parent: Some("b".to_string()),
                    ..EnvironmentDefinition::default()
                },
                EnvironmentDefinition {
                    name: "b".to_string(),
                    parent: Some("a".to_string()),
                    ..EnvironmentDefinition::default()
                },
            ],
        };
        let err = PackageRegistry::from_definitions(definitions).unwrap_err();
        assert!(matches!(err, SchemaError::ParentCycle { .. }));
    }

    #[test]
    fn unknown_parent_names_the_child() {
        let definitions = PackageDefinitions {
            sample_types: Vec::new(),
            environments: vec![EnvironmentDefinition {
                name: "human".to_string(),
                parent: Some("primate".to_string()),
                ..EnvironmentDefinition::default()
            }],
        };
        let err = PackageRegistry::from_definitions(definitions).unwrap_err();
        assert_eq!(err.to_string(), "environment human has unknown parent primate");
    }
}

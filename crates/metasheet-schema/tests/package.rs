use std::io::Write;

use metasheet_model::{FieldType, Literal};
use metasheet_schema::{PackageRegistry, SchemaError};

const PACKAGES: &str = r#"{
    "sample_types": [
        {"name": "stool", "display_name": "Stool"},
        {"name": "saliva", "display_name": "Saliva"},
        {"name": "vaginal", "display_name": "Vaginal mucus"}
    ],
    "environments": [
        {
            "name": "base",
            "schema": {
                "sample_type": {"type": "string", "required": true, "empty": false},
                "host_age": {"type": "integer", "min": 0, "field_desc": "age of the host"}
            }
        },
        {
            "name": "human",
            "display_name": "Human",
            "parent": "base",
            "schema": {
                "host_age": {"type": "integer", "min": 0, "max": 120},
                "host_taxid": {"type": "integer", "default": 9606}
            },
            "sample_types": [
                {"stool": {"sample_type": {"type": "string", "allowed": ["stool"], "default": "stool"}}},
                {"saliva": {"sample_type": {"type": "string", "allowed": ["saliva"], "default": "saliva"}}}
            ]
        },
        {
            "name": "human_adult",
            "display_name": "Adult human",
            "parent": "human",
            "schema": {
                "host_age": {"type": "integer", "min": 18, "max": 120}
            },
            "sample_types": [
                {"vaginal": {"sample_type": {"type": "string", "allowed": ["vaginal mucus"]}}}
            ]
        }
    ]
}"#;

fn registry() -> PackageRegistry {
    PackageRegistry::from_json_str(PACKAGES).unwrap()
}

#[test]
fn stack_runs_from_general_to_specific() {
    let registry = registry();
    assert_eq!(
        registry.parent_stack("human_adult").unwrap(),
        ["base", "human", "human_adult"]
    );
    assert_eq!(registry.parent_stack("base").unwrap(), ["base"]);
}

#[test]
fn specific_levels_replace_validation_groups() {
    let schema = registry().schema_for("human_adult", "stool").unwrap();
    let age = &schema["host_age"];
    assert_eq!(age.min, Some(Literal::Integer(18)));
    assert_eq!(age.max, Some(Literal::Integer(120)));
    // description survives group replacement
    assert_eq!(age.field_desc.as_deref(), Some("age of the host"));

    let sample_type = &schema["sample_type"];
    assert_eq!(sample_type.data_type.as_deref(), Some(FieldType::Text.as_str()));
    assert_eq!(sample_type.allowed, Some(vec![Literal::text("stool")]));
    assert_eq!(sample_type.required, None);
    assert!(schema.contains_key("host_taxid"));
}

#[test]
fn sample_type_without_override_uses_environment_schema() {
    let schema = registry().schema_for("base", "stool").unwrap();
    assert_eq!(schema["sample_type"].required, Some(true));
    assert!(!schema.contains_key("host_taxid"));
}

#[test]
fn combinations_follow_sample_type_order() {
    let keys: Vec<String> = registry()
        .combinations()
        .iter()
        .map(|combination| combination.key())
        .collect();
    assert_eq!(
        keys,
        [
            "human stool",
            "human saliva",
            "human_adult stool",
            "human_adult saliva",
            "human_adult vaginal",
        ]
    );
    assert_eq!(registry().combinations()[0].display_name, "Human Stool");
}

#[test]
fn unknown_lookups_are_errors() {
    let registry = registry();
    assert!(matches!(
        registry.schema_for("marine", "stool"),
        Err(SchemaError::UnknownEnvironment { .. })
    ));
    assert!(matches!(
        registry.schema_for("human", "blood"),
        Err(SchemaError::UnknownSampleType { .. })
    ));
}

#[test]
fn sample_type_entries_must_have_one_key() {
    let json = r#"{
        "sample_types": [{"name": "stool", "display_name": "Stool"}],
        "environments": [{"name": "base", "sample_types": [{"stool": {}, "saliva": {}}]}]
    }"#;
    let err = PackageRegistry::from_json_str(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "sample type entry is mis-structured; must have exactly one top-level key (found 2)"
    );
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PACKAGES.as_bytes()).unwrap();
    let registry = PackageRegistry::load(file.path()).unwrap();
    assert_eq!(registry.environments().len(), 3);
    assert_eq!(registry.sample_types().len(), 3);
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PackageRegistry::load(&dir.path().join("packages.json")).unwrap_err();
    assert!(matches!(err, SchemaError::Io { .. }));
}

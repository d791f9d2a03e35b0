//! Schema registry.
//!
//! Loads document type definitions, cross-checks every field's validator
//! parameters against the schema's enumerations and reference lists, and
//! serves them in declaration order. All checks happen here, at load time:
//! a definition that passes loading will never fail structurally during row
//! validation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use docv_model::{SchemaDefinition, ValidatorKind};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Immutable, ordered collection of loaded schema definitions.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaDefinition>,
}

impl SchemaRegistry {
    /// Validate and index a set of definitions. Declaration order is kept
    /// and is the detector's final tie-break.
    pub fn load(schemas: Vec<SchemaDefinition>) -> Result<Self> {
        if schemas.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut seen = BTreeSet::new();
        for schema in &schemas {
            if !seen.insert(schema.type_id.clone()) {
                return Err(ConfigError::DuplicateType {
                    type_id: schema.type_id.clone(),
                });
            }
            validate_schema(schema)?;
            debug!(type_id = %schema.type_id, fields = schema.fields.len(), "schema loaded");
        }

        info!(count = schemas.len(), "schema registry loaded");
        Ok(Self { schemas })
    }

    /// Load every `.json` definition in a directory, in filename order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut schemas = Vec::new();
        for path in paths {
            let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let schema: SchemaDefinition =
                serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            schemas.push(schema);
        }

        Self::load(schemas)
    }

    /// Schema for a document type.
    pub fn get(&self, type_id: &str) -> Result<&SchemaDefinition> {
        self.schemas
            .iter()
            .find(|s| s.type_id == type_id)
            .ok_or_else(|| ConfigError::UnknownType {
                type_id: type_id.to_string(),
            })
    }

    /// All schemas in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn validate_schema(schema: &SchemaDefinition) -> Result<()> {
    let type_id = &schema.type_id;

    if !(0.0..=100.0).contains(&schema.pass_threshold) {
        return Err(ConfigError::InvalidPassThreshold {
            type_id: type_id.clone(),
            threshold: schema.pass_threshold,
        });
    }

    let mut field_ids = BTreeSet::new();
    for field in &schema.fields {
        if !field_ids.insert(field.id.clone()) {
            return Err(ConfigError::DuplicateField {
                type_id: type_id.clone(),
                field: field.id.clone(),
            });
        }
        if field.max_matches == 0 {
            return Err(ConfigError::InvalidMaxMatches {
                type_id: type_id.clone(),
                field: field.id.clone(),
            });
        }
        validate_field_params(schema, field)?;
    }

    for lookup_field in &schema.lookup_fields {
        let Some(field) = schema.field(lookup_field) else {
            return Err(ConfigError::UnknownLookupField {
                type_id: type_id.clone(),
                field: lookup_field.clone(),
            });
        };
        // Lookup resolution needs a reference list and a threshold; both come
        // from the field's FUZZY_LIST parameters.
        if !matches!(field.validator, ValidatorKind::FuzzyList { .. }) {
            return Err(ConfigError::LookupFieldWithoutList {
                type_id: type_id.clone(),
                field: lookup_field.clone(),
            });
        }
    }

    Ok(())
}

fn validate_field_params(
    schema: &SchemaDefinition,
    field: &docv_model::FieldSpec,
) -> Result<()> {
    let type_id = &schema.type_id;
    match &field.validator {
        ValidatorKind::Regex { pattern } => {
            if let Err(err) = regex::Regex::new(pattern) {
                return Err(ConfigError::InvalidPattern {
                    type_id: type_id.clone(),
                    field: field.id.clone(),
                    pattern: pattern.clone(),
                    message: err.to_string(),
                });
            }
        }
        ValidatorKind::Enumeration { enum_name } => {
            if !schema.enums.contains_key(enum_name) {
                return Err(ConfigError::UnknownEnumeration {
                    type_id: type_id.clone(),
                    field: field.id.clone(),
                    enum_name: enum_name.clone(),
                });
            }
        }
        ValidatorKind::FuzzyList {
            list_name,
            min_score,
        } => {
            if !schema.lists.contains_key(list_name) {
                return Err(ConfigError::UnknownList {
                    type_id: type_id.clone(),
                    field: field.id.clone(),
                    list_name: list_name.clone(),
                });
            }
            if *min_score > 100 {
                return Err(ConfigError::InvalidMinScore {
                    type_id: type_id.clone(),
                    field: field.id.clone(),
                    min_score: *min_score,
                });
            }
        }
        ValidatorKind::NationalId
        | ValidatorKind::BankAccount
        | ValidatorKind::DecimalAmount
        | ValidatorKind::PostalCode
        | ValidatorKind::Date
        | ValidatorKind::None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use docv_model::{FieldSpec, ReferenceEntity};

    use super::*;

    fn field(id: &str, validator: ValidatorKind) -> FieldSpec {
        FieldSpec {
            id: id.to_string(),
            aliases: Vec::new(),
            validator,
            required: false,
            max_matches: 1,
            description: None,
        }
    }

    fn schema(type_id: &str, fields: Vec<FieldSpec>) -> SchemaDefinition {
        SchemaDefinition {
            type_id: type_id.to_string(),
            title: None,
            fields,
            enums: Default::default(),
            lists: Default::default(),
            lookup_fields: Vec::new(),
            pass_threshold: 80.0,
            output_template: None,
        }
    }

    #[test]
    fn rejects_unknown_enumeration() {
        let s = schema(
            "PAYMENT",
            vec![field(
                "CODE",
                ValidatorKind::Enumeration {
                    enum_name: "COUNTRY_CODES".to_string(),
                },
            )],
        );
        let err = SchemaRegistry::load(vec![s]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PAYMENT"), "{message}");
        assert!(message.contains("CODE"), "{message}");
        assert!(message.contains("COUNTRY_CODES"), "{message}");
    }

    #[test]
    fn rejects_unknown_reference_list() {
        let s = schema(
            "PAYMENT",
            vec![field(
                "BANK",
                ValidatorKind::FuzzyList {
                    list_name: "BANKS".to_string(),
                    min_score: 80,
                },
            )],
        );
        assert!(matches!(
            SchemaRegistry::load(vec![s]).unwrap_err(),
            ConfigError::UnknownList { .. }
        ));
    }

    #[test]
    fn rejects_invalid_regex() {
        let s = schema(
            "PAYMENT",
            vec![field(
                "REF",
                ValidatorKind::Regex {
                    pattern: "([".to_string(),
                },
            )],
        );
        assert!(matches!(
            SchemaRegistry::load(vec![s]).unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn rejects_lookup_field_without_list() {
        let mut s = schema("PAYMENT", vec![field("BANK", ValidatorKind::None)]);
        s.lookup_fields = vec!["BANK".to_string()];
        assert!(matches!(
            SchemaRegistry::load(vec![s]).unwrap_err(),
            ConfigError::LookupFieldWithoutList { .. }
        ));
    }

    #[test]
    fn accepts_consistent_schema_and_preserves_order() {
        let mut first = schema("PAYMENT", vec![field("REF", ValidatorKind::None)]);
        first.lists.insert(
            "BANKS".to_string(),
            vec![ReferenceEntity::new("First National Bank")],
        );
        first.fields.push(field(
            "BANK",
            ValidatorKind::FuzzyList {
                list_name: "BANKS".to_string(),
                min_score: 80,
            },
        ));
        first.lookup_fields = vec!["BANK".to_string()];
        let second = schema("DIVIDEND", vec![field("REF", ValidatorKind::None)]);

        let registry = SchemaRegistry::load(vec![first, second]).unwrap();
        let ids: Vec<_> = registry.iter().map(|s| s.type_id.as_str()).collect();
        assert_eq!(ids, vec!["PAYMENT", "DIVIDEND"]);
        assert!(registry.get("DIVIDEND").is_ok());
        assert!(matches!(
            registry.get("UNKNOWN").unwrap_err(),
            ConfigError::UnknownType { .. }
        ));
    }

    #[test]
    fn load_dir_reads_definitions_in_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = r#"{"type_id":"A","fields":[{"id":"F1","required":true}]}"#;
        let b = r#"{"type_id":"B","fields":[{"id":"F1"}]}"#;
        std::fs::write(dir.path().join("10_a.json"), a).unwrap();
        std::fs::write(dir.path().join("20_b.json"), b).unwrap();

        let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
        let ids: Vec<_> = registry.iter().map(|s| s.type_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(registry.get("A").unwrap().fields[0].required);
    }
}

//! Document type schema definitions.
//!
//! A [`SchemaDefinition`] describes one document type: its fields, the
//! validation each field carries, the enumerations and reference lists those
//! validators draw from, and which fields must additionally be resolved
//! against reference entities. Definitions are loaded once at startup and
//! never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_max_matches() -> usize {
    1
}

fn default_min_score() -> u8 {
    80
}

fn default_pass_threshold() -> f64 {
    80.0
}

/// Validator kind with its kind-specific parameters.
///
/// This is a closed set: adding a kind is a compile-time change, and every
/// dispatch site is an exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidatorKind {
    /// Full-string match against a regular expression.
    Regex { pattern: String },
    /// Case-sensitive membership in a named enumeration.
    #[serde(rename = "ENUM")]
    Enumeration { enum_name: String },
    /// Fuzzy membership in a named reference list.
    ///
    /// The best alias similarity (0-100) must reach `min_score`. On success
    /// the value is normalized to the canonical entity name.
    FuzzyList {
        list_name: String,
        #[serde(default = "default_min_score")]
        min_score: u8,
    },
    /// National ID number: fixed digit count plus checksum.
    NationalId,
    /// Bank account number: format-only check, no external verification.
    BankAccount,
    /// Non-negative decimal with at most two fractional digits.
    DecimalAmount,
    /// Postal code: digits and hyphens after space stripping.
    PostalCode,
    /// Date in one of an ordered list of known formats, or epoch seconds.
    Date,
    /// No validation; descriptive/free-text fields.
    #[serde(rename = "NONE")]
    None,
}

/// One schema field: identity, candidate column names, and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field identifier, unique within the schema.
    pub id: String,
    /// Candidate input column names, matched case-insensitively.
    /// The field id itself is always considered a candidate as well.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Validation applied to this field's values.
    #[serde(default = "ValidatorKind::none")]
    pub validator: ValidatorKind,
    /// Whether every row must carry a valid value for this field.
    #[serde(default)]
    pub required: bool,
    /// Maximum number of input columns this field may absorb.
    ///
    /// Extra matches beyond the first are exposed under numbered synthetic
    /// field ids (`FIELD_2`, `FIELD_3`, ...).
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
    /// Human description for review UIs.
    #[serde(default)]
    pub description: Option<String>,
}

impl ValidatorKind {
    fn none() -> Self {
        Self::None
    }
}

impl FieldSpec {
    /// Returns true if `column` matches this field's id or any alias,
    /// case-insensitively.
    pub fn matches_column(&self, column: &str) -> bool {
        let column = column.trim();
        self.id.eq_ignore_ascii_case(column)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(column))
    }
}

/// A reference entity: canonical display name plus alias strings used for
/// fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ReferenceEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Canonical name followed by every alias.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Full specification of one document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Document type identifier.
    pub type_id: String,
    /// Human title for review UIs.
    #[serde(default)]
    pub title: Option<String>,
    /// Ordered field specifications. Order is load order and is significant
    /// for detector tie-breaks and contested-column assignment.
    pub fields: Vec<FieldSpec>,
    /// Named enumerations referenced by ENUM validators.
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
    /// Named reference lists referenced by FUZZY_LIST validators and lookups.
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<ReferenceEntity>>,
    /// Fields whose validated values must additionally resolve against a
    /// reference entity.
    #[serde(default)]
    pub lookup_fields: Vec<String>,
    /// Minimum dataset-wide validation success rate (percent) before
    /// downstream generation is permitted.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Output-naming template, opaque to this core; consumed downstream.
    #[serde(default)]
    pub output_template: Option<String>,
}

impl SchemaDefinition {
    /// Look up a field spec by id.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields marked required, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Fields not marked required, in declaration order.
    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.required)
    }

    /// Entries of a named reference list, empty if the list is unknown.
    pub fn list_entries(&self, list_name: &str) -> &[ReferenceEntity] {
        self.lists.get(list_name).map_or(&[], Vec::as_slice)
    }

    /// Values of a named enumeration, empty if the enumeration is unknown.
    pub fn enum_values(&self, enum_name: &str) -> &[String] {
        self.enums.get(enum_name).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_kind_round_trips_wire_tags() {
        let json = r#"{"kind":"FUZZY_LIST","list_name":"BANKS","min_score":85}"#;
        let kind: ValidatorKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            kind,
            ValidatorKind::FuzzyList {
                list_name: "BANKS".to_string(),
                min_score: 85,
            }
        );

        let kind: ValidatorKind = serde_json::from_str(r#"{"kind":"ENUM","enum_name":"CC"}"#).unwrap();
        assert_eq!(
            kind,
            ValidatorKind::Enumeration {
                enum_name: "CC".to_string()
            }
        );

        let kind: ValidatorKind = serde_json::from_str(r#"{"kind":"NATIONAL_ID"}"#).unwrap();
        assert_eq!(kind, ValidatorKind::NationalId);

        let kind: ValidatorKind = serde_json::from_str(r#"{"kind":"POSTAL_CODE"}"#).unwrap();
        assert_eq!(kind, ValidatorKind::PostalCode);
    }

    #[test]
    fn fuzzy_list_min_score_defaults() {
        let kind: ValidatorKind =
            serde_json::from_str(r#"{"kind":"FUZZY_LIST","list_name":"BANKS"}"#).unwrap();
        assert_eq!(
            kind,
            ValidatorKind::FuzzyList {
                list_name: "BANKS".to_string(),
                min_score: 80,
            }
        );
    }

    #[test]
    fn field_matches_column_is_case_insensitive() {
        let field = FieldSpec {
            id: "COMPANY_NAME".to_string(),
            aliases: vec!["Company Name".to_string()],
            validator: ValidatorKind::None,
            required: true,
            max_matches: 1,
            description: None,
        };
        assert!(field.matches_column("company name"));
        assert!(field.matches_column("COMPANY_NAME"));
        assert!(field.matches_column("  Company Name "));
        assert!(!field.matches_column("COMPANY"));
    }
}

use std::path::PathBuf;

/// Configuration problems detected while loading schema definitions.
///
/// These are fatal: a misconfigured schema must abort startup rather than
/// silently skip validation later.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no schema definitions loaded")]
    Empty,

    #[error("duplicate schema type id: {type_id}")]
    DuplicateType { type_id: String },

    #[error("schema {type_id}: duplicate field id {field}")]
    DuplicateField { type_id: String, field: String },

    #[error("schema {type_id}, field {field}: invalid regex pattern {pattern:?}: {message}")]
    InvalidPattern {
        type_id: String,
        field: String,
        pattern: String,
        message: String,
    },

    #[error("schema {type_id}, field {field}: references unknown enumeration {enum_name:?}")]
    UnknownEnumeration {
        type_id: String,
        field: String,
        enum_name: String,
    },

    #[error("schema {type_id}, field {field}: references unknown reference list {list_name:?}")]
    UnknownList {
        type_id: String,
        field: String,
        list_name: String,
    },

    #[error("schema {type_id}, field {field}: fuzzy-list minimum score {min_score} exceeds 100")]
    InvalidMinScore {
        type_id: String,
        field: String,
        min_score: u8,
    },

    #[error("schema {type_id}, field {field}: max_matches must be at least 1")]
    InvalidMaxMatches { type_id: String, field: String },

    #[error("schema {type_id}: lookup field {field} does not exist")]
    UnknownLookupField { type_id: String, field: String },

    #[error(
        "schema {type_id}: lookup field {field} must carry a FUZZY_LIST validator naming its reference list"
    )]
    LookupFieldWithoutList { type_id: String, field: String },

    #[error("schema {type_id}: pass threshold {threshold} outside 0-100")]
    InvalidPassThreshold { type_id: String, threshold: f64 },

    #[error("unknown document type: {type_id}")]
    UnknownType { type_id: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

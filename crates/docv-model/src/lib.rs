#![deny(unsafe_code)]

pub mod columns;
pub mod lookup;
pub mod mapping;
pub mod record;
pub mod schema;
pub mod validation;

pub use columns::CaseInsensitiveColumns;
pub use lookup::{
    AttemptStatus, CandidateMatch, EntityCreationCandidate, ExceptionStatus, LookupAttempt,
    LookupException, Resolution, SimilarityFilter,
};
pub use mapping::ColumnMapping;
pub use record::{CellValue, Record};
pub use schema::{FieldSpec, ReferenceEntity, SchemaDefinition, ValidatorKind};
pub use validation::{
    DatasetValidation, DatasetValidationSummary, FieldOutcome, FieldStatus, RowValidationResult,
};

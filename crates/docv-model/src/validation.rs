//! Validation result types.
//!
//! Validation failure is data, not an error: partial invalidity is the
//! expected common case, and these records are what human review triages.

use serde::{Deserialize, Serialize};

/// Outcome of validating one field in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldStatus {
    /// Value passed the field's validator.
    Match,
    /// Value failed the field's validator.
    Mismatch,
    /// Field has no mapped column.
    MissingColumn,
}

/// Per-field validation detail for one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: String,
    pub column: Option<String>,
    pub value: Option<String>,
    /// Canonicalized value when the validator normalizes (fuzzy-list match,
    /// decimal, date).
    pub normalized: Option<String>,
    /// What a valid value would look like, for review UIs.
    pub expected: Option<String>,
    pub status: FieldStatus,
    pub errors: Vec<String>,
}

/// Validation result for one input row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowValidationResult {
    /// Zero-based row index within the dataset.
    pub row_index: usize,
    /// True iff every required field is a [`FieldStatus::Match`].
    pub valid: bool,
    pub fields: Vec<FieldOutcome>,
}

/// Aggregate validation statistics over one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetValidationSummary {
    /// Detected document type.
    pub type_id: String,
    /// Detector confidence score (0-100) for the type, surfaced for review.
    pub confidence: f64,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    /// valid/total x 100, rounded to one decimal.
    pub success_rate: f64,
}

impl DatasetValidationSummary {
    /// Whether the dataset clears a pass threshold (percent).
    ///
    /// The engine only reports; gating progression on this is caller policy.
    pub fn passes(&self, threshold: f64) -> bool {
        self.success_rate >= threshold
    }
}

/// Full validation output: aggregate summary plus per-row results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetValidation {
    pub summary: DatasetValidationSummary,
    pub rows: Vec<RowValidationResult>,
}

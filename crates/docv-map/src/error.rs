/// Detector failure: no schema cleared the minimum confidence.
///
/// Recoverable: the caller surfaces this for manual type selection. The best
/// score is carried so the UI can show how close the nearest schema came.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error(
        "no document type matched the input columns (best: {best_type_id} at {best_score:.1}%, minimum {min_confidence:.1}%)"
    )]
    NoMatch {
        best_type_id: String,
        best_score: f64,
        min_confidence: f64,
    },
}

/// Mapping edit failures.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("schema {type_id} has no field {field}")]
    UnknownField { type_id: String, field: String },

    #[error("column {column:?} is not an input column")]
    UnknownColumn { column: String },
}

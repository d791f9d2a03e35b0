//! Document type detection.
//!
//! Every registered schema is scored against the input column names; the
//! score is the percentage of required fields whose alias set intersects the
//! columns case-insensitively. Optional-field coverage is a tie-break only,
//! never sufficient to win on its own, and remaining ties go to the
//! first-registered schema. The whole procedure is deterministic: identical
//! inputs always produce the identical detection.

use docv_model::{CaseInsensitiveColumns, SchemaDefinition};
use docv_schema::SchemaRegistry;
use tracing::{debug, info};

use crate::error::DetectError;

/// Default minimum confidence (percent) below which detection reports no
/// match instead of forcing a low-confidence guess.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 50.0;

/// Outcome of a successful detection.
#[derive(Debug, Clone)]
pub struct Detection {
    pub type_id: String,
    /// Required-field coverage, 0-100. Surfaced to the caller for human
    /// review even on success.
    pub confidence: f64,
    pub required_matched: usize,
    pub required_total: usize,
    /// Optional-field coverage, 0-100; tie-break term only.
    pub optional_coverage: f64,
}

/// Detector over a loaded schema registry.
pub struct Detector<'a> {
    registry: &'a SchemaRegistry,
    min_confidence: f64,
}

impl<'a> Detector<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Score every schema and select the best match.
    pub fn detect(&self, input_columns: &[String]) -> Result<Detection, DetectError> {
        let columns = CaseInsensitiveColumns::new(input_columns);

        let mut best: Option<Detection> = None;
        for schema in self.registry.iter() {
            let candidate = score_schema(schema, &columns);
            debug!(
                type_id = %schema.type_id,
                confidence = candidate.confidence,
                optional_coverage = candidate.optional_coverage,
                "schema scored"
            );
            let wins = match &best {
                None => true,
                // Strictly-greater comparisons keep the first-registered
                // schema on full ties.
                Some(current) => {
                    candidate.confidence > current.confidence
                        || (candidate.confidence == current.confidence
                            && candidate.optional_coverage > current.optional_coverage)
                }
            };
            if wins {
                best = Some(candidate);
            }
        }

        // Registry loading rejects an empty schema set.
        let best = best.expect("registry holds at least one schema");

        if best.confidence < self.min_confidence {
            return Err(DetectError::NoMatch {
                best_type_id: best.type_id,
                best_score: best.confidence,
                min_confidence: self.min_confidence,
            });
        }

        info!(
            type_id = %best.type_id,
            confidence = best.confidence,
            "document type detected"
        );
        Ok(best)
    }
}

fn score_schema(schema: &SchemaDefinition, columns: &CaseInsensitiveColumns) -> Detection {
    let required: Vec<_> = schema.required_fields().collect();
    let optional: Vec<_> = schema.optional_fields().collect();

    let required_matched = required
        .iter()
        .filter(|f| field_has_column(f, columns))
        .count();
    let optional_matched = optional
        .iter()
        .filter(|f| field_has_column(f, columns))
        .count();

    // A schema with no required fields is scored on all-field coverage so it
    // is not unconditionally a perfect match.
    let confidence = if required.is_empty() {
        let total = schema.fields.len();
        if total == 0 {
            0.0
        } else {
            optional_matched as f64 / total as f64 * 100.0
        }
    } else {
        required_matched as f64 / required.len() as f64 * 100.0
    };

    let optional_coverage = if optional.is_empty() {
        0.0
    } else {
        optional_matched as f64 / optional.len() as f64 * 100.0
    };

    Detection {
        type_id: schema.type_id.clone(),
        confidence,
        required_matched,
        required_total: required.len(),
        optional_coverage,
    }
}

fn field_has_column(field: &docv_model::FieldSpec, columns: &CaseInsensitiveColumns) -> bool {
    columns.contains(&field.id) || field.aliases.iter().any(|alias| columns.contains(alias))
}

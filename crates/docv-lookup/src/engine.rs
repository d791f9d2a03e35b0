//! Lookup resolution engine.
//!
//! After validation, fields declared as lookup fields must resolve to a
//! reference entity, not merely look plausible. The engine runs one attempt
//! per (valid row, lookup field) pair against the live entity store; misses
//! become exception records with ranked candidates for human review.

use std::collections::BTreeMap;

use docv_model::{
    AttemptStatus, CandidateMatch, ColumnMapping, DatasetValidation, ExceptionStatus,
    FieldSpec, LookupAttempt, LookupException, Record, ReferenceEntity, SchemaDefinition,
    ValidatorKind,
};
use docv_validate::best_list_match;
use tracing::{debug, info};

use crate::ledger::LookupLedger;
use crate::store::EntityStore;

/// Number of ranked candidates attached to an exception.
pub const CANDIDATE_LIMIT: usize = 5;

/// Runs lookup attempts for one schema's lookup fields.
pub struct LookupEngine<'a> {
    schema: &'a SchemaDefinition,
}

impl<'a> LookupEngine<'a> {
    pub fn new(schema: &'a SchemaDefinition) -> Self {
        Self { schema }
    }

    /// Attempt resolution for every valid row and every lookup field,
    /// recording attempts and exceptions into `ledger`.
    ///
    /// Invalid rows are skipped entirely: their values have already failed
    /// validation and re-reporting them as lookup exceptions would be noise.
    /// Entities are read from `store` rather than the schema so entities
    /// created mid-session take effect.
    pub fn resolve_rows(
        &self,
        mapping: &ColumnMapping,
        validation: &DatasetValidation,
        rows: &[Record],
        store: &dyn EntityStore,
        ledger: &mut LookupLedger,
    ) {
        for row_result in &validation.rows {
            if !row_result.valid {
                continue;
            }
            let Some(row) = rows.iter().find(|r| r.index == row_result.row_index) else {
                continue;
            };
            for field_id in &self.schema.lookup_fields {
                let Some(field) = self.schema.field(field_id) else {
                    continue;
                };
                self.resolve_one(field, mapping, row, store, ledger);
            }
        }
        info!(
            type_id = %self.schema.type_id,
            attempts = ledger.attempts().len(),
            pending = ledger.pending_count(),
            "lookup resolution complete"
        );
    }

    fn resolve_one(
        &self,
        field: &FieldSpec,
        mapping: &ColumnMapping,
        row: &Record,
        store: &dyn EntityStore,
        ledger: &mut LookupLedger,
    ) {
        let ValidatorKind::FuzzyList {
            list_name,
            min_score,
        } = &field.validator
        else {
            // Schema loading guarantees lookup fields carry a list validator.
            return;
        };

        let value = mapping
            .column_for(&field.id)
            .and_then(|column| row.text(column));
        let Some(value) = value else {
            self.record_exception(
                field,
                list_name,
                row,
                String::new(),
                None,
                "no value available for lookup".to_string(),
                Vec::new(),
                ledger,
            );
            return;
        };

        let entries = store.list_entities(list_name);
        match best_list_match(value, &entries) {
            Some((name, score)) if score >= f64::from(*min_score) => {
                let id = ledger.allocate_attempt_id();
                debug!(field = %field.id, value, matched = name, score, "lookup hit");
                ledger.push_attempt(LookupAttempt {
                    id,
                    row_index: row.index,
                    list_name: list_name.clone(),
                    field: field.id.clone(),
                    submitted: value.to_string(),
                    matched: Some(name.to_string()),
                    score: Some(score),
                    status: AttemptStatus::Matched,
                });
            }
            best => {
                let score = best.map(|(_, s)| s);
                let message = match best {
                    Some((name, score)) => format!(
                        "no close match in {list_name} (best: {name}, score: {score:.1}%)"
                    ),
                    None => format!("reference list {list_name} is empty"),
                };
                let candidates = ranked_candidates(value, &entries);
                self.record_exception(
                    field,
                    list_name,
                    row,
                    value.to_string(),
                    score,
                    message,
                    candidates,
                    ledger,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record_exception(
        &self,
        field: &FieldSpec,
        list_name: &str,
        row: &Record,
        value: String,
        score: Option<f64>,
        message: String,
        candidates: Vec<CandidateMatch>,
        ledger: &mut LookupLedger,
    ) {
        let attempt_id = ledger.allocate_attempt_id();
        ledger.push_attempt(LookupAttempt {
            id: attempt_id,
            row_index: row.index,
            list_name: list_name.to_string(),
            field: field.id.clone(),
            submitted: value.clone(),
            matched: None,
            score,
            status: AttemptStatus::Exception,
        });
        let exception_id = ledger.allocate_exception_id();
        debug!(field = %field.id, value, exception_id, "lookup exception");
        ledger.push_exception(LookupException {
            id: exception_id,
            attempt_id,
            row_index: row.index,
            list_name: list_name.to_string(),
            field: field.id.clone(),
            value,
            message,
            row_data: row.snapshot(),
            candidates,
            status: ExceptionStatus::Pending,
            resolved_value: None,
            resolved_at: None,
        });
    }
}

/// Rank entities by best alias similarity, best first, capped at
/// [`CANDIDATE_LIMIT`]. Equal scores order lexicographically by name.
pub fn ranked_candidates(value: &str, entries: &[ReferenceEntity]) -> Vec<CandidateMatch> {
    let needle = value.to_lowercase();
    let mut best_per_entity: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in entries {
        for alias in entry.all_names() {
            let score = rapidfuzz_ratio(&needle, &alias.to_lowercase());
            let slot = best_per_entity.entry(entry.name.as_str()).or_insert(0.0);
            if score > *slot {
                *slot = score;
            }
        }
    }
    let mut ranked: Vec<CandidateMatch> = best_per_entity
        .into_iter()
        .map(|(name, score)| CandidateMatch {
            value: name.to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.value.cmp(&b.value))
    });
    ranked.truncate(CANDIDATE_LIMIT);
    ranked
}

fn rapidfuzz_ratio(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

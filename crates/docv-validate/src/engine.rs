//! Row validation engine.
//!
//! Runs every mapped field's validator over every row and aggregates the
//! dataset summary. The engine only measures; gating downstream generation
//! on the pass threshold is caller policy.

use docv_model::{
    ColumnMapping, DatasetValidation, DatasetValidationSummary, FieldOutcome, FieldStatus, Record,
    RowValidationResult, SchemaDefinition,
};
use tracing::{debug, info};

use crate::checks::SchemaChecks;

/// Validation engine for one schema. Construction compiles the schema's
/// REGEX patterns; validation reuses them across every row.
pub struct ValidationEngine<'a> {
    schema: &'a SchemaDefinition,
    checks: SchemaChecks<'a>,
    confidence: f64,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(schema: &'a SchemaDefinition) -> Self {
        Self {
            schema,
            checks: SchemaChecks::new(schema),
            confidence: 0.0,
        }
    }

    /// Attach the detector confidence score, surfaced on the summary.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Validate every row against the mapping.
    pub fn validate(&self, mapping: &ColumnMapping, rows: &[Record]) -> DatasetValidation {
        let row_results: Vec<RowValidationResult> = rows
            .iter()
            .map(|row| self.validate_row(mapping, row))
            .collect();

        let total_rows = row_results.len();
        let valid_rows = row_results.iter().filter(|r| r.valid).count();
        let success_rate = if total_rows == 0 {
            0.0
        } else {
            round_one_decimal(valid_rows as f64 / total_rows as f64 * 100.0)
        };

        info!(
            type_id = %self.schema.type_id,
            total_rows,
            valid_rows,
            success_rate,
            "dataset validated"
        );

        DatasetValidation {
            summary: DatasetValidationSummary {
                type_id: self.schema.type_id.clone(),
                confidence: self.confidence,
                total_rows,
                valid_rows,
                invalid_rows: total_rows - valid_rows,
                success_rate,
            },
            rows: row_results,
        }
    }

    fn validate_row(&self, mapping: &ColumnMapping, row: &Record) -> RowValidationResult {
        let mut valid = true;
        let mut fields = Vec::new();

        for field in &self.schema.fields {
            let Some(column) = mapping.column_for(&field.id) else {
                // Unmapped field: invalid only when required.
                if field.required {
                    valid = false;
                }
                fields.push(FieldOutcome {
                    field: field.id.clone(),
                    column: None,
                    value: None,
                    normalized: None,
                    expected: None,
                    status: FieldStatus::MissingColumn,
                    errors: vec!["field has no matching column".to_string()],
                });
                continue;
            };

            let value = row.text(column);
            let check = self.checks.check_value(value, field);
            if !check.valid && field.required {
                valid = false;
            }
            fields.push(FieldOutcome {
                field: field.id.clone(),
                column: Some(column.to_string()),
                value: value.map(str::to_string),
                normalized: check.normalized,
                expected: check.expected,
                status: if check.valid {
                    FieldStatus::Match
                } else {
                    FieldStatus::Mismatch
                },
                errors: check.error.into_iter().collect(),
            });
        }

        // Synthetic assignments (FIELD_2, FIELD_3, ...) from max_matches > 1
        // validate against the base field's spec.
        for (field_id, assigned) in &mapping.assignments {
            if self.schema.field(field_id).is_some() {
                continue;
            }
            let (Some(base), Some(column)) = (
                base_field_id(field_id).and_then(|id| self.schema.field(id)),
                assigned.as_deref(),
            ) else {
                continue;
            };

            let value = row.text(column);
            let check = self.checks.check_value(value, base);
            debug!(field = %field_id, column, valid = check.valid, "extra match validated");
            fields.push(FieldOutcome {
                field: field_id.clone(),
                column: Some(column.to_string()),
                value: value.map(str::to_string),
                normalized: check.normalized,
                expected: check.expected,
                status: if check.valid {
                    FieldStatus::Match
                } else {
                    FieldStatus::Mismatch
                },
                errors: check.error.into_iter().collect(),
            });
        }

        RowValidationResult {
            row_index: row.index,
            valid,
            fields,
        }
    }
}

/// Strip a trailing `_N` suffix from a synthetic field id.
fn base_field_id(field_id: &str) -> Option<&str> {
    let (base, suffix) = field_id.rsplit_once('_')?;
    suffix
        .chars()
        .all(|c| c.is_ascii_digit())
        .then_some(base)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use docv_model::{FieldSpec, ValidatorKind};

    use super::*;

    fn spec_field(id: &str, validator: ValidatorKind, required: bool) -> FieldSpec {
        FieldSpec {
            id: id.to_string(),
            aliases: Vec::new(),
            validator,
            required,
            max_matches: 1,
            description: None,
        }
    }

    fn schema() -> SchemaDefinition {
        SchemaDefinition {
            type_id: "PAYMENT".to_string(),
            title: None,
            fields: vec![
                spec_field("AMOUNT", ValidatorKind::DecimalAmount, true),
                spec_field("NOTE", ValidatorKind::None, false),
            ],
            enums: Default::default(),
            lists: Default::default(),
            lookup_fields: Vec::new(),
            pass_threshold: 80.0,
            output_template: None,
        }
    }

    fn mapping(pairs: &[(&str, Option<&str>)]) -> ColumnMapping {
        let mut assignments = BTreeMap::new();
        for (field, column) in pairs {
            assignments.insert((*field).to_string(), column.map(str::to_string));
        }
        ColumnMapping {
            type_id: "PAYMENT".to_string(),
            assignments,
        }
    }

    #[test]
    fn row_valid_iff_required_fields_match() {
        let schema = schema();
        let mapping = mapping(&[("AMOUNT", Some("Amt")), ("NOTE", None)]);
        let rows = vec![
            Record::from_pairs(0, [("Amt", "12.50")]),
            Record::from_pairs(1, [("Amt", "oops")]),
        ];

        let engine = ValidationEngine::new(&schema);
        let result = engine.validate(&mapping, &rows);

        assert!(result.rows[0].valid);
        assert!(!result.rows[1].valid);
        // Optional NOTE is unmapped: reported as MISSING_COLUMN, ignored for
        // validity.
        assert_eq!(
            result.rows[0].fields[1].status,
            FieldStatus::MissingColumn
        );
        assert_eq!(result.summary.success_rate, 50.0);
    }

    #[test]
    fn missing_required_column_invalidates_all_rows() {
        let schema = schema();
        let mapping = mapping(&[("AMOUNT", None), ("NOTE", None)]);
        let rows = vec![Record::from_pairs(0, [("Other", "x")])];

        let result = ValidationEngine::new(&schema).validate(&mapping, &rows);
        assert!(!result.rows[0].valid);
        assert_eq!(result.summary.valid_rows, 0);
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        let schema = schema();
        let mapping = mapping(&[("AMOUNT", Some("Amt")), ("NOTE", None)]);
        // 2 of 3 valid -> 66.666... -> 66.7
        let rows = vec![
            Record::from_pairs(0, [("Amt", "1.00")]),
            Record::from_pairs(1, [("Amt", "2.00")]),
            Record::from_pairs(2, [("Amt", "bad")]),
        ];

        let result = ValidationEngine::new(&schema).validate(&mapping, &rows);
        assert_eq!(result.summary.success_rate, 66.7);
    }

    #[test]
    fn gate_against_pass_threshold() {
        let schema = schema();
        let mapping = mapping(&[("AMOUNT", Some("Amt")), ("NOTE", None)]);
        let rows: Vec<Record> = (0..100)
            .map(|i| {
                let value = if i < 80 { "10.00" } else { "bad" };
                Record::from_pairs(i, [("Amt", value)])
            })
            .collect();

        let result = ValidationEngine::new(&schema).validate(&mapping, &rows);
        assert_eq!(result.summary.success_rate, 80.0);
        assert!(result.summary.passes(80.0));
        assert!(!result.summary.passes(81.0));
    }

    #[test]
    fn synthetic_fields_validate_against_base_spec() {
        let mut schema = schema();
        schema.fields[0].max_matches = 2;
        let mapping = mapping(&[
            ("AMOUNT", Some("Amt")),
            ("AMOUNT_2", Some("Amt 2")),
            ("NOTE", None),
        ]);
        let rows = vec![Record::from_pairs(0, [("Amt", "1.00"), ("Amt 2", "bad")])];

        let result = ValidationEngine::new(&schema).validate(&mapping, &rows);
        let extra = result.rows[0]
            .fields
            .iter()
            .find(|f| f.field == "AMOUNT_2")
            .unwrap();
        assert_eq!(extra.status, FieldStatus::Mismatch);
    }

    #[test]
    fn regex_fields_validate_across_many_rows() {
        let mut schema = schema();
        schema.fields.push(spec_field(
            "REF",
            ValidatorKind::Regex {
                pattern: r"[A-Z]{3}\d{4}".to_string(),
            },
            true,
        ));
        let mapping = mapping(&[
            ("AMOUNT", Some("Amt")),
            ("NOTE", None),
            ("REF", Some("Ref")),
        ]);
        let rows: Vec<Record> = (0..50)
            .map(|i| {
                let reference = if i % 2 == 0 { "ABC1234" } else { "nope" };
                Record::from_pairs(i, [("Amt", "1.00"), ("Ref", reference)])
            })
            .collect();

        let result = ValidationEngine::new(&schema).validate(&mapping, &rows);
        assert_eq!(result.summary.valid_rows, 25);
    }

    #[test]
    fn empty_dataset_reports_zero_rate() {
        let schema = schema();
        let mapping = mapping(&[("AMOUNT", Some("Amt")), ("NOTE", None)]);
        let result = ValidationEngine::new(&schema).validate(&mapping, &[]);
        assert_eq!(result.summary.total_rows, 0);
        assert_eq!(result.summary.success_rate, 0.0);
    }
}

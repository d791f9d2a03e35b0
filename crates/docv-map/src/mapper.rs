//! Column-to-field mapping.
//!
//! `generate` builds the inferred mapping from exact case-insensitive alias
//! matches; `generate_with_rows` optionally adds a content-scan fallback for
//! fields the aliases missed. `apply_overrides` layers manual edits over a
//! mapping while keeping the one-column-one-field invariant.

use std::collections::{BTreeMap, BTreeSet};

use docv_model::{CaseInsensitiveColumns, ColumnMapping, FieldSpec, Record, SchemaDefinition};
use docv_validate::SchemaChecks;
use tracing::{debug, info};

use crate::error::MapError;

/// Options for mapping generation.
#[derive(Debug, Clone, Copy)]
pub struct MapperOptions {
    /// When alias matching leaves a field unmapped, scan unclaimed columns'
    /// contents and claim one whose values validate well enough. Off by
    /// default so the inferred mapping depends on column names alone.
    pub content_scan: bool,
    /// Minimum valid percentage for a content-scan claim.
    pub content_threshold: f64,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            content_scan: false,
            content_threshold: 70.0,
        }
    }
}

/// Build the inferred mapping from column names alone.
///
/// Fields are visited in declaration order; each claims the first unclaimed
/// input column matching its id or aliases, so a contested column goes to
/// the earlier field. Fields with `max_matches > 1` absorb further matching
/// columns under numbered synthetic ids.
pub fn generate(schema: &SchemaDefinition, input_columns: &[String]) -> ColumnMapping {
    generate_inner(schema, input_columns, None, MapperOptions::default())
}

/// Build the inferred mapping, optionally refining with a content scan.
pub fn generate_with_rows(
    schema: &SchemaDefinition,
    input_columns: &[String],
    rows: &[Record],
    options: MapperOptions,
) -> ColumnMapping {
    generate_inner(schema, input_columns, Some(rows), options)
}

fn generate_inner(
    schema: &SchemaDefinition,
    input_columns: &[String],
    rows: Option<&[Record]>,
    options: MapperOptions,
) -> ColumnMapping {
    let mut mapping = ColumnMapping::new(&schema.type_id);
    let mut claimed: BTreeSet<String> = BTreeSet::new();

    for field in &schema.fields {
        let mut matches = alias_matches(field, input_columns, &claimed);
        matches.truncate(field.max_matches);

        match matches.first() {
            Some(column) => {
                claimed.insert(column.clone());
                mapping
                    .assignments
                    .insert(field.id.clone(), Some(column.clone()));
            }
            None => {
                mapping.assignments.insert(field.id.clone(), None);
            }
        }

        for (extra_index, column) in matches.iter().enumerate().skip(1) {
            claimed.insert(column.clone());
            mapping.assignments.insert(
                format!("{}_{}", field.id, extra_index + 1),
                Some(column.clone()),
            );
        }
    }

    if options.content_scan
        && let Some(rows) = rows
    {
        content_scan(schema, input_columns, rows, options, &mut claimed, &mut mapping);
    }

    info!(
        type_id = %schema.type_id,
        mapped = mapping.mapped_count(),
        fields = schema.fields.len(),
        "mapping generated"
    );
    mapping
}

/// Input columns matching a field's aliases, unclaimed ones only, in input
/// order.
fn alias_matches(
    field: &FieldSpec,
    input_columns: &[String],
    claimed: &BTreeSet<String>,
) -> Vec<String> {
    input_columns
        .iter()
        .filter(|column| !claimed.contains(*column) && field.matches_column(column))
        .cloned()
        .collect()
}

fn content_scan(
    schema: &SchemaDefinition,
    input_columns: &[String],
    rows: &[Record],
    options: MapperOptions,
    claimed: &mut BTreeSet<String>,
    mapping: &mut ColumnMapping,
) {
    let checks = SchemaChecks::new(schema);
    for field in &schema.fields {
        if mapping.column_for(&field.id).is_some() {
            continue;
        }

        let mut best: Option<(&str, f64)> = None;
        for column in input_columns {
            if claimed.contains(column) {
                continue;
            }
            let pct = checks.column_valid_percentage(column, field, rows);
            // Strictly-greater keeps the earliest column on ties.
            if pct >= options.content_threshold && best.is_none_or(|(_, b)| pct > b) {
                best = Some((column.as_str(), pct));
            }
        }

        if let Some((column, pct)) = best {
            debug!(field = %field.id, column, valid_pct = pct, "content scan claimed column");
            claimed.insert(column.to_string());
            mapping
                .assignments
                .insert(field.id.clone(), Some(column.to_string()));
        }
    }
}

/// Apply manual overrides to a mapping, producing the replacement mapping.
///
/// Overrides replace entries wholesale. When an override assigns a column
/// that another field currently owns, the prior owner is unassigned: a
/// column maps to at most one field at a time.
pub fn apply_overrides(
    schema: &SchemaDefinition,
    current: &ColumnMapping,
    overrides: &BTreeMap<String, Option<String>>,
) -> Result<ColumnMapping, MapError> {
    for field_id in overrides.keys() {
        let known = schema.field(field_id).is_some()
            || current.assignments.contains_key(field_id);
        if !known {
            return Err(MapError::UnknownField {
                type_id: schema.type_id.clone(),
                field: field_id.clone(),
            });
        }
    }

    let mut updated = current.clone();
    for (field_id, assignment) in overrides {
        if let Some(column) = assignment {
            // Unassign any prior owner before reassigning.
            let prior: Vec<String> = updated
                .assignments
                .iter()
                .filter(|(other, assigned)| {
                    *other != field_id && assigned.as_deref() == Some(column.as_str())
                })
                .map(|(other, _)| other.clone())
                .collect();
            for other in prior {
                debug!(field = %other, column = %column, "unassigned prior owner");
                updated.assignments.insert(other, None);
            }
        }
        updated
            .assignments
            .insert(field_id.clone(), assignment.clone());
    }

    Ok(updated)
}

/// Resolve the column an input name refers to, case-insensitively.
pub fn resolve_column(input_columns: &[String], name: &str) -> Result<String, MapError> {
    let columns = CaseInsensitiveColumns::new(input_columns);
    columns
        .get(name)
        .map(str::to_string)
        .ok_or_else(|| MapError::UnknownColumn {
            column: name.to_string(),
        })
}

//! Entity creation from flagged exceptions.
//!
//! Exceptions resolved as for-creation are grouped by (list, value) so one
//! new entity can settle every row that submitted the same unknown name.
//! Creating the entity retroactively accepts the matching exceptions, both
//! flagged and still-pending ones.

use std::collections::BTreeMap;

use docv_model::{EntityCreationCandidate, ExceptionStatus, ReferenceEntity};
use tracing::info;

use crate::error::Result;
use crate::ledger::LookupLedger;
use crate::resolution::accept_via_entity;
use crate::store::EntityStore;

/// Group for-creation exceptions into creation candidates, one per distinct
/// (list, value) pair, in first-seen order.
pub fn creation_candidates(ledger: &LookupLedger) -> Vec<EntityCreationCandidate> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut grouped: BTreeMap<(String, String), EntityCreationCandidate> = BTreeMap::new();

    for exception in ledger.for_creation() {
        let key = (exception.list_name.clone(), exception.value.clone());
        if let Some(candidate) = grouped.get_mut(&key) {
            candidate.exception_ids.push(exception.id);
        } else {
            order.push(key.clone());
            grouped.insert(
                key,
                EntityCreationCandidate {
                    list_name: exception.list_name.clone(),
                    value: exception.value.clone(),
                    exception_ids: vec![exception.id],
                    sample: exception.row_data.clone(),
                },
            );
        }
    }

    order
        .into_iter()
        .filter_map(|key| grouped.remove(&key))
        .collect()
}

/// Create a reference entity and retroactively accept every for-creation or
/// still-pending exception whose submitted value now matches one of the new
/// entity's names. Returns the number of exceptions resolved.
pub fn create_entity(
    ledger: &mut LookupLedger,
    store: &mut dyn EntityStore,
    list_name: &str,
    entity: ReferenceEntity,
) -> Result<usize> {
    store.create_entity(list_name, entity.clone())?;

    let matching: Vec<_> = ledger
        .exceptions()
        .iter()
        .filter(|e| {
            (e.is_pending() || e.status == ExceptionStatus::ForCreation)
                && e.list_name == list_name
                && entity.all_names().any(|n| n.eq_ignore_ascii_case(&e.value))
        })
        .cloned()
        .collect();

    for exception in &matching {
        accept_via_entity(ledger, exception, &entity.name);
    }
    info!(
        list_name,
        entity = %entity.name,
        resolved = matching.len(),
        "reference entity created"
    );
    Ok(matching.len())
}

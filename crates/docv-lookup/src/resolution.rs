//! Human resolution of lookup exceptions.
//!
//! A resolution always applies to one anchor exception, and may additionally
//! be applied in batch to every other pending exception matching a
//! similarity filter. Resolved exceptions keep their records for audit.

use docv_model::{
    AttemptStatus, ExceptionStatus, LookupException, Resolution, SimilarityFilter,
};
use tracing::info;

use crate::error::{LookupError, Result};
use crate::ledger::LookupLedger;
use crate::store::EntityStore;

/// Apply a resolution to the exception with id `id`.
///
/// With a non-empty `filter`, the same resolution is also applied to every
/// other pending exception matching the anchor under the filter, each with
/// its own submitted value. Returns the number of exceptions transitioned,
/// anchor included.
pub fn resolve_exception(
    ledger: &mut LookupLedger,
    store: &mut dyn EntityStore,
    id: u64,
    resolution: &Resolution,
    filter: Option<SimilarityFilter>,
) -> Result<usize> {
    let anchor = ledger
        .exception(id)
        .ok_or(LookupError::UnknownException { id })?;
    if !anchor.is_pending() {
        return Err(LookupError::AlreadyResolved { id });
    }
    if let Resolution::Accept { value, .. } = resolution
        && value.trim().is_empty()
    {
        return Err(LookupError::MissingValue { id });
    }

    let mut targets = vec![id];
    if let Some(filter) = filter
        && !filter.is_empty()
    {
        let anchor = anchor.clone();
        targets.extend(
            ledger
                .pending_exceptions()
                .filter(|e| e.id != id && filter.matches(&anchor, e))
                .map(|e| e.id),
        );
    }

    for target in &targets {
        apply_to_one(ledger, store, *target, resolution)?;
    }
    info!(
        exception_id = id,
        affected = targets.len(),
        "lookup exception resolved"
    );
    Ok(targets.len())
}

fn apply_to_one(
    ledger: &mut LookupLedger,
    store: &mut dyn EntityStore,
    id: u64,
    resolution: &Resolution,
) -> Result<()> {
    let Some(exception) = ledger.exception(id) else {
        return Err(LookupError::UnknownException { id });
    };
    let attempt_id = exception.attempt_id;
    let list_name = exception.list_name.clone();
    let submitted = exception.value.clone();

    match resolution {
        Resolution::Accept {
            value,
            persist_alias,
        } => {
            if *persist_alias && !submitted.trim().is_empty() {
                store.append_alias(&list_name, value, &submitted)?;
            }
            mark(
                ledger,
                id,
                attempt_id,
                ExceptionStatus::Accepted,
                Some(value.clone()),
            );
        }
        Resolution::Reject => {
            mark(ledger, id, attempt_id, ExceptionStatus::Rejected, None);
        }
        Resolution::ForCreation => {
            mark(ledger, id, attempt_id, ExceptionStatus::ForCreation, None);
        }
    }
    Ok(())
}

fn mark(
    ledger: &mut LookupLedger,
    id: u64,
    attempt_id: u64,
    status: ExceptionStatus,
    resolved_value: Option<String>,
) {
    if let Some(exception) = ledger.exception_mut(id) {
        exception.status = status;
        exception.resolved_value = resolved_value.clone();
        exception.resolved_at = Some(chrono::Utc::now().to_rfc3339());
    }
    if let Some(attempt) = ledger.attempt_mut(attempt_id) {
        attempt.status = match status {
            ExceptionStatus::Accepted => AttemptStatus::Matched,
            // Rejected and for-creation attempts stay exceptions until a
            // created entity resolves them.
            _ => AttemptStatus::Exception,
        };
        if status == ExceptionStatus::Accepted {
            attempt.matched = resolved_value;
        }
    }
}

/// Resolve an exception as accepted without consulting its store, used when
/// a newly created entity retroactively satisfies it.
pub(crate) fn accept_via_entity(ledger: &mut LookupLedger, exception: &LookupException, entity_name: &str) {
    mark(
        ledger,
        exception.id,
        exception.attempt_id,
        ExceptionStatus::Accepted,
        Some(entity_name.to_string()),
    );
    if let Some(attempt) = ledger.attempt_mut(exception.attempt_id) {
        attempt.score = Some(100.0);
    }
}

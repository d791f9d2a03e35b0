//! Ledger of lookup attempts and exceptions for one dataset.
//!
//! The ledger is append-mostly: attempts and exceptions are recorded by the
//! engine and only their status fields change afterwards, so resolved
//! exceptions remain available as an audit trail.

use docv_model::{AttemptStatus, ExceptionStatus, LookupAttempt, LookupException};
use serde::{Deserialize, Serialize};

/// All lookup state for one dataset run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LookupLedger {
    attempts: Vec<LookupAttempt>,
    exceptions: Vec<LookupException>,
    next_attempt_id: u64,
    next_exception_id: u64,
}

impl LookupLedger {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
            exceptions: Vec::new(),
            next_attempt_id: 1,
            next_exception_id: 1,
        }
    }

    pub(crate) fn allocate_attempt_id(&mut self) -> u64 {
        let id = self.next_attempt_id;
        self.next_attempt_id += 1;
        id
    }

    pub(crate) fn allocate_exception_id(&mut self) -> u64 {
        let id = self.next_exception_id;
        self.next_exception_id += 1;
        id
    }

    pub(crate) fn push_attempt(&mut self, attempt: LookupAttempt) {
        self.attempts.push(attempt);
    }

    pub(crate) fn push_exception(&mut self, exception: LookupException) {
        self.exceptions.push(exception);
    }

    pub fn attempts(&self) -> &[LookupAttempt] {
        &self.attempts
    }

    pub fn exceptions(&self) -> &[LookupException] {
        &self.exceptions
    }

    pub fn exception(&self, id: u64) -> Option<&LookupException> {
        self.exceptions.iter().find(|e| e.id == id)
    }

    pub(crate) fn exception_mut(&mut self, id: u64) -> Option<&mut LookupException> {
        self.exceptions.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn attempt_mut(&mut self, id: u64) -> Option<&mut LookupAttempt> {
        self.attempts.iter_mut().find(|a| a.id == id)
    }

    /// Exceptions still awaiting resolution, in recording order.
    pub fn pending_exceptions(&self) -> impl Iterator<Item = &LookupException> {
        self.exceptions.iter().filter(|e| e.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending_exceptions().count()
    }

    pub fn matched_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.status == AttemptStatus::Matched)
            .count()
    }

    /// Exceptions flagged for entity creation, in recording order.
    pub fn for_creation(&self) -> impl Iterator<Item = &LookupException> {
        self.exceptions
            .iter()
            .filter(|e| e.status == ExceptionStatus::ForCreation)
    }

    /// True once no exception is pending. Downstream generation is expected
    /// to wait for this.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }
}

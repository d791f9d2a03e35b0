//! Lookup resolution types.
//!
//! A [`LookupAttempt`] records one (row, lookup field) resolution against a
//! reference list. Attempts that fail become [`LookupException`]s, which wait
//! for human resolution and are retained for audit once resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status of a lookup attempt. Attempts are recorded already settled; an
/// exception attempt flips to matched only when its exception is accepted
/// or satisfied by a created entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Matched,
    Exception,
}

/// One lookup attempt for a (row, lookup field) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupAttempt {
    pub id: u64,
    pub row_index: usize,
    /// Reference list the value was resolved against (the lookup type).
    pub list_name: String,
    pub field: String,
    /// Value as submitted in the input row.
    pub submitted: String,
    /// Canonical entity name on a hit.
    pub matched: Option<String>,
    /// Best similarity score observed (0-100).
    pub score: Option<f64>,
    pub status: AttemptStatus,
}

/// A candidate entity for a failed lookup, with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Canonical entity name.
    pub value: String,
    /// Similarity score (0-100) of the entity's best alias.
    pub score: f64,
}

/// Resolution status of a lookup exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionStatus {
    Pending,
    Accepted,
    Rejected,
    ForCreation,
}

/// A lookup attempt that failed to match and awaits human resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupException {
    pub id: u64,
    /// Attempt this exception originated from.
    pub attempt_id: u64,
    pub row_index: usize,
    pub list_name: String,
    pub field: String,
    /// The offending value.
    pub value: String,
    pub message: String,
    /// Full data snapshot of the originating row.
    pub row_data: BTreeMap<String, String>,
    /// Ranked candidates, best first. Equally-scored candidates are kept and
    /// ordered lexicographically rather than picked from silently.
    pub candidates: Vec<CandidateMatch>,
    pub status: ExceptionStatus,
    /// Value the exception was accepted with, for audit.
    pub resolved_value: Option<String>,
    /// RFC 3339 timestamp of the resolution, for audit.
    pub resolved_at: Option<String>,
}

impl LookupException {
    pub fn is_pending(&self) -> bool {
        self.status == ExceptionStatus::Pending
    }
}

/// Human resolution applied to an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Resolution {
    /// Treat the supplied value as the matched resolution.
    Accept {
        value: String,
        /// Also persist the originally submitted value as a new alias of the
        /// matched entity, so the same input no longer raises an exception.
        #[serde(default)]
        persist_alias: bool,
    },
    /// Permanently exclude; no further action.
    Reject,
    /// Flag to later spawn a new reference entity.
    ForCreation,
}

/// Criteria for applying one resolution to similar pending exceptions.
///
/// All selected criteria must match (conjunction). An all-false filter
/// matches nothing beyond the anchor exception.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimilarityFilter {
    pub same_list: bool,
    pub same_field: bool,
    pub same_message: bool,
}

impl SimilarityFilter {
    pub fn is_empty(&self) -> bool {
        !(self.same_list || self.same_field || self.same_message)
    }

    /// Whether `other` matches `anchor` under the selected criteria.
    pub fn matches(&self, anchor: &LookupException, other: &LookupException) -> bool {
        if self.same_list && anchor.list_name != other.list_name {
            return false;
        }
        if self.same_field && anchor.field != other.field {
            return false;
        }
        if self.same_message && anchor.message != other.message {
            return false;
        }
        true
    }
}

/// Grouped view of for-creation exceptions, used to pre-fill a new entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCreationCandidate {
    pub list_name: String,
    /// The unmatched value shared by the grouped exceptions.
    pub value: String,
    pub exception_ids: Vec<u64>,
    /// Row data from one exemplar exception.
    pub sample: BTreeMap<String, String>,
}

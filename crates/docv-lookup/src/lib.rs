#![deny(unsafe_code)]

//! Lookup resolution: matching validated values against reference entity
//! lists, with an exception workflow for the values that do not match.

pub mod creation;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod resolution;
pub mod store;

pub use creation::{create_entity, creation_candidates};
pub use engine::{CANDIDATE_LIMIT, LookupEngine, ranked_candidates};
pub use error::{LookupError, Result};
pub use ledger::LookupLedger;
pub use resolution::resolve_exception;
pub use store::{EntityStore, InMemoryEntityStore, ListEvent};

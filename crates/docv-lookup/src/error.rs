/// Lookup workflow failures.
///
/// Only workflow misuse is an error here. A value failing to match a
/// reference list is not: that is an exception record, data for human
/// review.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no lookup exception with id {id}")]
    UnknownException { id: u64 },

    #[error("lookup exception {id} is already resolved")]
    AlreadyResolved { id: u64 },

    #[error("accepting lookup exception {id} requires a non-empty value")]
    MissingValue { id: u64 },

    #[error("no reference list named {list_name:?}")]
    UnknownList { list_name: String },

    #[error("reference list {list_name} has no entity named {entity:?}")]
    UnknownEntity { list_name: String, entity: String },

    #[error("reference list {list_name} already has an entity named {entity:?}")]
    DuplicateEntity { list_name: String, entity: String },
}

pub type Result<T> = std::result::Result<T, LookupError>;

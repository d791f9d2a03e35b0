#![deny(unsafe_code)]

pub mod checks;
pub mod engine;

pub use checks::{FieldCheck, SchemaChecks, best_list_match};
pub use engine::ValidationEngine;

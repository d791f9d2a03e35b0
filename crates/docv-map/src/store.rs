//! Mapping persistence.
//!
//! One mapping exists per (session, document type). Saves replace the stored
//! mapping wholesale; delete removes it entirely, after which callers
//! typically regenerate from scratch, deliberately discarding manual edits.
//! Per-session write atomicity is the collaborator's contract; sessions are
//! fully independent.

use std::collections::BTreeMap;

use anyhow::Result;
use docv_model::ColumnMapping;

/// Abstract store for persisted column mappings.
pub trait MappingStore {
    fn load(&self, session: &str, type_id: &str) -> Result<Option<ColumnMapping>>;
    fn save(&mut self, session: &str, mapping: &ColumnMapping) -> Result<()>;
    /// Returns true if a mapping existed and was removed.
    fn delete(&mut self, session: &str, type_id: &str) -> Result<bool>;
}

/// In-memory store for tests and embedding callers.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    mappings: BTreeMap<(String, String), ColumnMapping>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for InMemoryMappingStore {
    fn load(&self, session: &str, type_id: &str) -> Result<Option<ColumnMapping>> {
        Ok(self
            .mappings
            .get(&(session.to_string(), type_id.to_string()))
            .cloned())
    }

    fn save(&mut self, session: &str, mapping: &ColumnMapping) -> Result<()> {
        self.mappings.insert(
            (session.to_string(), mapping.type_id.clone()),
            mapping.clone(),
        );
        Ok(())
    }

    fn delete(&mut self, session: &str, type_id: &str) -> Result<bool> {
        Ok(self
            .mappings
            .remove(&(session.to_string(), type_id.to_string()))
            .is_some())
    }
}

//! Reference entity store.
//!
//! Mutations are modeled as an append-only log of list events applied
//! atomically by the store, so concurrent creation attempts within a session
//! cannot silently lose an entry. Timeouts and retries for remote stores are
//! the collaborator's concern.

use std::collections::BTreeMap;

use docv_model::{ReferenceEntity, SchemaDefinition};
use serde::Serialize;

use crate::error::{LookupError, Result};

/// One mutation applied to a reference list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ListEvent {
    EntityCreated {
        list_name: String,
        entity: ReferenceEntity,
    },
    AliasAdded {
        list_name: String,
        entity_name: String,
        alias: String,
    },
}

/// Abstract store of named reference entity lists.
pub trait EntityStore {
    /// Entities of a named list; empty when the list is unknown.
    fn list_entities(&self, list_name: &str) -> Vec<ReferenceEntity>;

    /// Append an alias to an existing entity. Idempotent: appending an alias
    /// the entity already carries is a no-op.
    fn append_alias(&mut self, list_name: &str, entity_name: &str, alias: &str) -> Result<()>;

    /// Append a brand-new entity to a list.
    fn create_entity(&mut self, list_name: &str, entity: ReferenceEntity) -> Result<()>;
}

/// In-memory entity store, seeded from a schema's reference lists.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    lists: BTreeMap<String, Vec<ReferenceEntity>>,
    events: Vec<ListEvent>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a schema's reference lists.
    pub fn from_schema(schema: &SchemaDefinition) -> Self {
        Self {
            lists: schema.lists.clone(),
            events: Vec::new(),
        }
    }

    pub fn with_list(mut self, list_name: impl Into<String>, entries: Vec<ReferenceEntity>) -> Self {
        self.lists.insert(list_name.into(), entries);
        self
    }

    /// Mutation log, in application order.
    pub fn events(&self) -> &[ListEvent] {
        &self.events
    }
}

impl EntityStore for InMemoryEntityStore {
    fn list_entities(&self, list_name: &str) -> Vec<ReferenceEntity> {
        self.lists.get(list_name).cloned().unwrap_or_default()
    }

    fn append_alias(&mut self, list_name: &str, entity_name: &str, alias: &str) -> Result<()> {
        let entries = self
            .lists
            .get_mut(list_name)
            .ok_or_else(|| LookupError::UnknownList {
                list_name: list_name.to_string(),
            })?;
        let entity = entries
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(entity_name))
            .ok_or_else(|| LookupError::UnknownEntity {
                list_name: list_name.to_string(),
                entity: entity_name.to_string(),
            })?;

        if entity.all_names().any(|n| n.eq_ignore_ascii_case(alias)) {
            return Ok(());
        }
        entity.aliases.push(alias.to_string());
        self.events.push(ListEvent::AliasAdded {
            list_name: list_name.to_string(),
            entity_name: entity_name.to_string(),
            alias: alias.to_string(),
        });
        Ok(())
    }

    fn create_entity(&mut self, list_name: &str, entity: ReferenceEntity) -> Result<()> {
        let entries = self
            .lists
            .get_mut(list_name)
            .ok_or_else(|| LookupError::UnknownList {
                list_name: list_name.to_string(),
            })?;
        if entries
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(&entity.name))
        {
            return Err(LookupError::DuplicateEntity {
                list_name: list_name.to_string(),
                entity: entity.name,
            });
        }
        entries.push(entity.clone());
        self.events.push(ListEvent::EntityCreated {
            list_name: list_name.to_string(),
            entity,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryEntityStore {
        InMemoryEntityStore::new().with_list(
            "BANKS",
            vec![ReferenceEntity {
                name: "First National Bank".to_string(),
                aliases: vec!["FNB".to_string()],
            }],
        )
    }

    #[test]
    fn alias_append_is_idempotent_and_logged() {
        let mut store = store();
        store
            .append_alias("BANKS", "First National Bank", "First National")
            .unwrap();
        store
            .append_alias("BANKS", "first national bank", "first national")
            .unwrap();

        let entities = store.list_entities("BANKS");
        assert_eq!(
            entities[0].aliases,
            vec!["FNB".to_string(), "First National".to_string()]
        );
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let mut store = store();
        let err = store
            .create_entity("BANKS", ReferenceEntity::new("FIRST NATIONAL BANK"))
            .unwrap_err();
        assert!(matches!(err, LookupError::DuplicateEntity { .. }));
    }

    #[test]
    fn unknown_list_is_an_error() {
        let mut store = store();
        assert!(matches!(
            store.append_alias("GHOSTS", "X", "Y").unwrap_err(),
            LookupError::UnknownList { .. }
        ));
    }
}

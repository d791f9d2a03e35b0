//! Column-to-field mapping for one dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from schema field id to the input column feeding it.
///
/// One mapping exists per dataset. It is generated by the mapper, may be
/// replaced wholesale by manual edits, and is consulted by the validation
/// engine. `None` means the field is unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Document type this mapping targets.
    pub type_id: String,
    /// Field id -> matched input column, in field order.
    pub assignments: BTreeMap<String, Option<String>>,
}

impl ColumnMapping {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            assignments: BTreeMap::new(),
        }
    }

    /// Column currently assigned to a field.
    pub fn column_for(&self, field_id: &str) -> Option<&str> {
        self.assignments
            .get(field_id)
            .and_then(|c| c.as_deref())
    }

    /// Field currently owning a column, if any.
    pub fn owner_of(&self, column: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(_, assigned)| assigned.as_deref() == Some(column))
            .map(|(field, _)| field.as_str())
    }

    /// Number of fields with an assigned column.
    pub fn mapped_count(&self) -> usize {
        self.assignments.values().filter(|c| c.is_some()).count()
    }

    /// Field ids with no assigned column.
    pub fn unmapped_fields(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, assigned)| assigned.is_none())
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_lookup() {
        let mut mapping = ColumnMapping::new("PAYMENT");
        mapping
            .assignments
            .insert("AMOUNT".to_string(), Some("Amount Paid".to_string()));
        mapping.assignments.insert("REFERENCE".to_string(), None);

        assert_eq!(mapping.column_for("AMOUNT"), Some("Amount Paid"));
        assert_eq!(mapping.owner_of("Amount Paid"), Some("AMOUNT"));
        assert_eq!(mapping.owner_of("Other"), None);
        assert_eq!(mapping.mapped_count(), 1);
        assert_eq!(mapping.unmapped_fields(), vec!["REFERENCE"]);
    }
}

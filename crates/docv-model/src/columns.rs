//! Case-insensitive column name lookup.

use std::collections::HashMap;

/// Index of column names keyed case-insensitively, preserving the original
/// spelling. On duplicate keys the first spelling wins.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveColumns {
    map: HashMap<String, String>,
}

impl CaseInsensitiveColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for name in names {
            let name = name.as_ref().trim();
            let key = name.to_ascii_uppercase();
            map.entry(key).or_insert_with(|| name.to_string());
        }
        Self { map }
    }

    /// Original spelling of a column, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&name.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

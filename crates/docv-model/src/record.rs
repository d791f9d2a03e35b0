//! Row abstraction over loosely-typed tabular input.
//!
//! A [`Record`] is a fixed-schema view of one input row: cells keyed by
//! column name with an explicit present/absent distinction, so "column not
//! supplied" and "cell is empty" stay separate, testable cases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Trimmed text, or `None` for missing/blank cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            Self::Missing => None,
        }
    }
}

/// One input row, keyed by column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Zero-based row index within the dataset.
    pub index: usize,
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// Build a record from (column, value) pairs.
    pub fn from_pairs<I, K, V>(index: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new(index);
        for (column, value) in pairs {
            record.set(column, CellValue::Text(value.into()));
        }
        record
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Cell for a column, `None` if the column was never supplied.
    pub fn cell(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Trimmed text of a cell, `None` for absent, missing, or blank cells.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(CellValue::as_text)
    }

    /// Snapshot of all textual cells, used for exception audit records.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.cells
            .iter()
            .filter_map(|(column, cell)| match cell {
                CellValue::Text(s) => Some((column.clone(), s.clone())),
                CellValue::Missing => None,
            })
            .collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

//! Filesystem-backed mapping repository.
//!
//! Mappings are stored as JSON files named `{session}_{type_id}.json` under
//! a base directory, one file per (session, document type). The stored form
//! wraps the mapping with a save timestamp and a format version.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docv_model::ColumnMapping;
use serde::{Deserialize, Serialize};

use crate::store::MappingStore;

fn default_version() -> String {
    "1.0".to_string()
}

/// Mapping plus repository metadata, as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMapping {
    #[serde(flatten)]
    pub mapping: ColumnMapping,
    /// ISO 8601 save timestamp.
    pub saved_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl StoredMapping {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            version: default_version(),
        }
    }
}

/// Directory-based repository for persisted mappings.
#[derive(Debug, Clone)]
pub struct FsMappingRepository {
    base_dir: PathBuf,
}

impl FsMappingRepository {
    /// Create a repository at the given directory, creating it if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!("failed to create mapping repository: {}", base_dir.display())
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn exists(&self, session: &str, type_id: &str) -> bool {
        self.mapping_path(session, type_id).exists()
    }

    fn mapping_path(&self, session: &str, type_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}.json", normalize_id(session), normalize_id(type_id)))
    }
}

impl MappingStore for FsMappingRepository {
    fn load(&self, session: &str, type_id: &str) -> Result<Option<ColumnMapping>> {
        let path = self.mapping_path(session, type_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read mapping from {}", path.display()))?;
        let stored: StoredMapping = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse mapping from {}", path.display()))?;
        Ok(Some(stored.mapping))
    }

    fn save(&mut self, session: &str, mapping: &ColumnMapping) -> Result<()> {
        let path = self.mapping_path(session, &mapping.type_id);
        let stored = StoredMapping::new(mapping.clone());
        let json = serde_json::to_string_pretty(&stored)
            .with_context(|| format!("failed to serialize mapping for {}", mapping.type_id))?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write mapping to {}", path.display()))?;
        Ok(())
    }

    fn delete(&mut self, session: &str, type_id: &str) -> Result<bool> {
        let path = self.mapping_path(session, type_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to delete mapping: {}", path.display()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Normalize an identifier for use in filenames.
fn normalize_id(id: &str) -> String {
    id.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

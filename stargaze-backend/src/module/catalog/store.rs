///! Durable catalog store - the collection of record
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use stargaze_common::{CatalogEntry, ConstellId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read catalog document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The durable document collection. Read-only to the backend: records
/// are created and updated by the store administrator.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    async fn find_by_id(&self, id: ConstellId) -> Result<Option<CatalogEntry>, StoreError>;

    /// Entries whose id is not in `ids` - the complement query the
    /// cache population path runs after a partial fast-tier hit.
    async fn find_not_in(&self, ids: &[ConstellId]) -> Result<Vec<CatalogEntry>, StoreError>;
}

/// Catalog collection backed by a JSON document file, loaded once at
/// startup and served from memory.
pub struct JsonCatalogStore {
    entries: Vec<CatalogEntry>,
}

impl JsonCatalogStore {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Read { path: path_str.clone(), source })?;

        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .map_err(|source| StoreError::Parse { path: path_str.clone(), source })?;

        tracing::info!("Loaded {} catalog entries from {}", entries.len(), path_str);
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn find_all(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.entries.clone())
    }

    async fn find_by_id(&self, id: ConstellId) -> Result<Option<CatalogEntry>, StoreError> {
        Ok(self.entries.iter().find(|e| e.constell_id == id).cloned())
    }

    async fn find_not_in(&self, ids: &[ConstellId]) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| !ids.contains(&e.constell_id))
            .cloned()
            .collect())
    }
}

//! In-memory manifest store.

use std::collections::HashMap;
use std::sync::RwLock;

use tessera_types::BlockKey;
use tracing::debug;

use crate::error::MetaError;
use crate::traits::ManifestStore;

/// Manifest store backed by a `RwLock<HashMap>`.
///
/// Nothing survives a restart. Used in tests and by nodes started with
/// `--memory`.
#[derive(Default)]
pub struct MemoryManifestStore {
    manifests: RwLock<HashMap<String, Vec<BlockKey>>>,
}

impl MemoryManifestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn save(&self, filename: &str, keys: &[BlockKey]) -> Result<(), MetaError> {
        let mut map = self.manifests.write().expect("lock poisoned");
        map.insert(filename.to_string(), keys.to_vec());
        debug!(filename, blocks = keys.len(), "saved manifest in memory");
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Vec<BlockKey>, MetaError> {
        let map = self.manifests.read().expect("lock poisoned");
        map.get(filename)
            .cloned()
            .ok_or_else(|| MetaError::NotFound(filename.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, MetaError> {
        let map = self.manifests.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

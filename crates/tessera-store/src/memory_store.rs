//! In-memory block storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tessera_types::BlockKey;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::BlockStore;

/// In-memory block store backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for nodes started with `--memory`.
#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<BlockKey, Bytes>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blocks held.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Whether the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a reference to the inner map (for testing purposes).
    #[cfg(test)]
    pub(crate) fn inner(&self) -> &RwLock<HashMap<BlockKey, Bytes>> {
        &self.blocks
    }
}

#[async_trait::async_trait]
impl BlockStore for MemoryStore {
    async fn put(&self, data: Bytes) -> Result<BlockKey, StoreError> {
        let key = BlockKey::from_data(&data);
        let mut map = self.blocks.write().expect("lock poisoned");
        if !map.contains_key(&key) {
            debug!(%key, size = data.len(), "storing block in memory");
            map.insert(key, data);
        }
        Ok(key)
    }

    async fn get(&self, key: BlockKey) -> Result<Bytes, StoreError> {
        let map = self.blocks.read().expect("lock poisoned");
        let data = map.get(&key).ok_or(StoreError::NotFound(key))?;
        let actual = BlockKey::from_data(data);
        if actual != key {
            return Err(StoreError::CorruptBlock {
                expected: key,
                actual,
            });
        }
        Ok(data.clone())
    }

    async fn contains(&self, key: BlockKey) -> Result<bool, StoreError> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(&key))
    }

    async fn list(&self) -> Result<Vec<BlockKey>, StoreError> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.keys().copied().collect())
    }

    async fn verify(&self, key: BlockKey) -> Result<bool, StoreError> {
        let map = self.blocks.read().expect("lock poisoned");
        match map.get(&key) {
            Some(data) => Ok(BlockKey::from_data(data) == key),
            None => Err(StoreError::NotFound(key)),
        }
    }
}

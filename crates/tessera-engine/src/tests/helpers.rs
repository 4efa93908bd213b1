//! Shared test utilities for tessera-engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tempfile::TempDir;
use tessera_meta::MemoryManifestStore;
use tessera_store::{BlockStore, MemoryStore, StoreError};
use tessera_types::BlockKey;

use crate::node::{TesseraNode, TesseraNodeConfig};

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Create an in-memory node with the given block size.
pub fn memory_node(block_size: u32) -> TesseraNode {
    TesseraNode::in_memory(TesseraNodeConfig { block_size })
}

/// Create a disk-backed node in a fresh temp dir.
///
/// The `TempDir` must outlive the node.
pub fn file_node(block_size: u32) -> (TesseraNode, TempDir) {
    let dir = TempDir::new().unwrap();
    let node = TesseraNode::open(TesseraNodeConfig { block_size }, dir.path()).unwrap();
    (node, dir)
}

/// Block store that starts failing writes after `ok_puts` successful ones.
pub struct FailingStore {
    inner: MemoryStore,
    ok_puts: usize,
    puts: AtomicUsize,
}

impl FailingStore {
    pub fn new(ok_puts: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            ok_puts,
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl BlockStore for FailingStore {
    async fn put(&self, data: Bytes) -> Result<BlockKey, StoreError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.ok_puts {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(data).await
    }

    async fn get(&self, key: BlockKey) -> Result<Bytes, StoreError> {
        self.inner.get(key).await
    }

    async fn contains(&self, key: BlockKey) -> Result<bool, StoreError> {
        self.inner.contains(key).await
    }

    async fn list(&self) -> Result<Vec<BlockKey>, StoreError> {
        self.inner.list().await
    }

    async fn verify(&self, key: BlockKey) -> Result<bool, StoreError> {
        self.inner.verify(key).await
    }
}

/// Node whose block store fails after `ok_puts` writes.
pub fn failing_node(block_size: u32, ok_puts: usize) -> (TesseraNode, Arc<FailingStore>) {
    let store = Arc::new(FailingStore::new(ok_puts));
    let node = TesseraNode::new(
        TesseraNodeConfig { block_size },
        store.clone(),
        Arc::new(MemoryManifestStore::new()),
    );
    (node, store)
}

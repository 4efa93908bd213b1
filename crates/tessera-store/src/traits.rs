//! Core trait for block storage.

use bytes::Bytes;
use tessera_types::BlockKey;

use crate::error::StoreError;

/// Trait for storing and retrieving content-addressed blocks.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Data is passed as [`Bytes`] to avoid copies between the chunker and the
/// backend.
#[async_trait::async_trait]
pub trait BlockStore: Send + Sync {
    /// Store a block and return its key.
    ///
    /// If a block with the same key is already present nothing is written.
    /// Concurrent calls with identical data must all succeed and must never
    /// expose a partially written block.
    async fn put(&self, data: Bytes) -> Result<BlockKey, StoreError>;

    /// Retrieve a block by key.
    ///
    /// Returns [`StoreError::NotFound`] if absent and
    /// [`StoreError::CorruptBlock`] if the stored bytes no longer hash to `key`.
    async fn get(&self, key: BlockKey) -> Result<Bytes, StoreError>;

    /// Check whether a block exists.
    async fn contains(&self, key: BlockKey) -> Result<bool, StoreError>;

    /// List all stored block keys.
    async fn list(&self) -> Result<Vec<BlockKey>, StoreError>;

    /// Verify block integrity by re-hashing and comparing to the key.
    async fn verify(&self, key: BlockKey) -> Result<bool, StoreError>;
}

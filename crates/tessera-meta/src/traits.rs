//! Core trait for manifest storage.

use tessera_types::BlockKey;

use crate::error::MetaError;

/// Trait for recording the ordered block list of each named file.
#[async_trait::async_trait]
pub trait ManifestStore: Send + Sync {
    /// Atomically record `keys` as the manifest for `filename`, replacing
    /// any previous one.
    async fn save(&self, filename: &str, keys: &[BlockKey]) -> Result<(), MetaError>;

    /// Load the manifest for `filename`.
    ///
    /// Returns [`MetaError::NotFound`] if the file was never ingested.
    async fn load(&self, filename: &str) -> Result<Vec<BlockKey>, MetaError>;

    /// List every filename with a manifest, sorted.
    async fn list(&self) -> Result<Vec<String>, MetaError>;
}

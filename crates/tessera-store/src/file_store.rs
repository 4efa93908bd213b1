//! File-based block storage backend.
//!
//! Stores one file per block directly under the base directory:
//! `{base_dir}/{hex}`. The flat layout is part of the on-disk contract and
//! must stay readable by existing deployments.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tessera_types::BlockKey;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::traits::BlockStore;

/// File-based block store with a flat `{base_dir}/{hex}` layout.
///
/// Writes are atomic: data is written and synced to a uniquely named
/// dot-prefixed temp file in the same directory, then renamed into place.
/// Two writers racing on the same key each use their own temp file, so the
/// loser's rename just replaces identical bytes.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new file store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Root directory holding the block files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full file path for a block key.
    fn block_path(&self, key: &BlockKey) -> PathBuf {
        self.base_dir.join(key.to_string())
    }
}

/// Write `data` to a fresh dot-prefixed temp file in `dir`, fsync it, then
/// rename it onto `path`.
///
/// The temp file is removed on drop if any step fails.
fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait::async_trait]
impl BlockStore for FileStore {
    async fn put(&self, data: Bytes) -> Result<BlockKey, StoreError> {
        let key = BlockKey::from_data(&data);
        let path = self.block_path(&key);

        if tokio::fs::try_exists(&path).await? {
            debug!(%key, "block already stored, skipping write");
            return Ok(key);
        }

        let dir = self.base_dir.clone();
        let target = path.clone();
        let size = data.len();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &data))
            .await
            .map_err(std::io::Error::other)??;

        debug!(%key, path = %path.display(), size, "stored block to file");
        Ok(key)
    }

    async fn get(&self, key: BlockKey) -> Result<Bytes, StoreError> {
        let path = self.block_path(&key);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                // Verify-on-read: a short or altered file never reaches the caller.
                let actual = BlockKey::from_data(&data);
                if actual != key {
                    error!(
                        expected = %key,
                        %actual,
                        size = data.len(),
                        "block corruption detected on read"
                    );
                    return Err(StoreError::CorruptBlock {
                        expected: key,
                        actual,
                    });
                }
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(key)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn contains(&self, key: BlockKey) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.block_path(&key)).await?)
    }

    async fn list(&self) -> Result<Vec<BlockKey>, StoreError> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Temp files are dot-prefixed and never parse as a key.
            if let Some(name) = entry.file_name().to_str()
                && let Ok(key) = name.parse::<BlockKey>()
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    async fn verify(&self, key: BlockKey) -> Result<bool, StoreError> {
        match tokio::fs::read(self.block_path(&key)).await {
            Ok(data) => Ok(BlockKey::from_data(&data) == key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(key)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

//! [`TesseraNode`], the registry object that ties all components together.
//!
//! A `TesseraNode` owns the block store, manifest store and keyword index,
//! and runs the ingest / retrieve / search pipelines against them.

use std::path::Path;
use std::sync::Arc;

use tessera_cas::Chunker;
use tessera_index::{KeywordIndex, normalize_keyword};
use tessera_meta::{FileManifestStore, ManifestStore, MemoryManifestStore};
use tessera_store::{BlockStore, FileStore, MemoryStore, StoreError};
use tessera_types::{DEFAULT_BLOCK_SIZE, validate_filename};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::error::EngineError;

/// Subdirectory of the data dir holding block files.
const BLOCKS_DIR: &str = "blocks";
/// Subdirectory of the data dir holding manifest files.
const MANIFESTS_DIR: &str = "manifests";

/// Configuration for creating a [`TesseraNode`].
#[derive(Debug, Clone)]
pub struct TesseraNodeConfig {
    /// Maximum block size in bytes.
    pub block_size: u32,
}

impl Default for TesseraNodeConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    /// Filename the manifest was saved under.
    pub filename: String,
    /// Number of blocks in the manifest.
    pub blocks: usize,
    /// Blocks that were not already in the store when this ingest saw them.
    pub new_blocks: usize,
    /// Total bytes ingested.
    pub bytes: u64,
}

/// Answer to a keyword query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The normalized keyword that was looked up.
    pub keyword: String,
    /// Matching filenames, sorted.
    pub filenames: Vec<String>,
    /// `filenames.len()`.
    pub count: usize,
}

/// Point-in-time sizes of the node's stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    /// Distinct blocks persisted.
    pub blocks: usize,
    /// Filenames with a manifest.
    pub files: usize,
    /// Distinct keywords indexed since startup.
    pub keywords: usize,
}

/// The node orchestrator.
///
/// Constructed once per process and shared as `Arc<TesseraNode>`. The
/// keyword index lives only in memory and starts empty on every boot.
pub struct TesseraNode {
    /// Content-addressed block storage.
    store: Arc<dyn BlockStore>,
    /// Filename → ordered block keys.
    manifests: Arc<dyn ManifestStore>,
    /// Keyword → filenames.
    index: KeywordIndex,
    /// Fixed-size chunker.
    chunker: Chunker,
}

impl TesseraNode {
    /// Create a node from explicit components.
    pub fn new(
        config: TesseraNodeConfig,
        store: Arc<dyn BlockStore>,
        manifests: Arc<dyn ManifestStore>,
    ) -> Self {
        Self {
            store,
            manifests,
            index: KeywordIndex::new(),
            chunker: Chunker::new(config.block_size),
        }
    }

    /// Open a disk-backed node under `data_dir`.
    ///
    /// Blocks go to `{data_dir}/blocks/{hex}` and manifests to
    /// `{data_dir}/manifests/{filename}.txt`.
    pub fn open(
        config: TesseraNodeConfig,
        data_dir: impl AsRef<Path>,
    ) -> Result<Self, EngineError> {
        let data_dir = data_dir.as_ref();
        let store = FileStore::new(data_dir.join(BLOCKS_DIR))?;
        let manifests = FileManifestStore::new(data_dir.join(MANIFESTS_DIR))?;
        Ok(Self::new(config, Arc::new(store), Arc::new(manifests)))
    }

    /// Create a node that keeps everything in memory.
    pub fn in_memory(config: TesseraNodeConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryManifestStore::new()),
        )
    }

    /// Return a reference to the block store.
    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// Return a reference to the manifest store.
    pub fn manifests(&self) -> &Arc<dyn ManifestStore> {
        &self.manifests
    }

    /// Return a reference to the keyword index.
    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    /// Configured maximum block size.
    pub fn block_size(&self) -> u32 {
        self.chunker.block_size()
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    /// Ingest an upload: chunk → store each block → index each block →
    /// save the manifest.
    ///
    /// The manifest is only written once the whole stream has been stored.
    /// If reading or storing any block fails, the error is returned and no
    /// manifest is saved; blocks written before the failure stay in the
    /// store, where other files may reuse them.
    pub async fn ingest<R>(&self, filename: &str, reader: R) -> Result<IngestReceipt, EngineError>
    where
        R: AsyncRead + Unpin,
    {
        check_filename(filename)?;
        info!(filename, block_size = self.block_size(), "ingest: starting");

        let mut blocks = self.chunker.blocks(reader);
        let mut keys = Vec::new();
        let mut new_blocks = 0;

        while let Some(block) = blocks.next_block().await? {
            let fresh = !self.store.contains(block.key).await?;
            let key = self.store.put(block.data.clone()).await?;
            self.index.index(filename, &block.data);

            if fresh {
                new_blocks += 1;
            }
            debug!(
                filename,
                %key,
                offset = block.offset,
                size = block.data.len(),
                fresh,
                "ingest: stored block"
            );
            keys.push(key);
        }

        self.manifests.save(filename, &keys).await?;

        let receipt = IngestReceipt {
            filename: filename.to_string(),
            blocks: keys.len(),
            new_blocks,
            bytes: blocks.bytes_read(),
        };
        info!(
            filename,
            blocks = receipt.blocks,
            new_blocks = receipt.new_blocks,
            bytes = receipt.bytes,
            "ingest: complete"
        );
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Reconstruct `filename` into `writer`, block by block in manifest order.
    ///
    /// Returns the number of bytes written. Stops at the first block that
    /// is missing or corrupt; bytes already written to `writer` before that
    /// point cannot be taken back, so callers must discard partial output
    /// on error.
    pub async fn retrieve_to<W>(&self, filename: &str, mut writer: W) -> Result<u64, EngineError>
    where
        W: AsyncWrite + Unpin,
    {
        check_filename(filename)?;
        let keys = self.manifests.load(filename).await?;
        debug!(filename, blocks = keys.len(), "retrieve: loaded manifest");

        let mut written = 0u64;
        for key in keys {
            let data = self.store.get(key).await.map_err(|e| match e {
                StoreError::NotFound(key) => {
                    error!(filename, %key, "retrieve: manifest references missing block");
                    EngineError::MissingBlock {
                        filename: filename.to_string(),
                        key,
                    }
                }
                StoreError::CorruptBlock { expected, actual } => EngineError::CorruptRead {
                    key: expected,
                    actual,
                },
                other => EngineError::Store(other),
            })?;
            writer.write_all(&data).await?;
            written += data.len() as u64;
        }
        writer.flush().await?;

        info!(filename, bytes = written, "retrieve: complete");
        Ok(written)
    }

    /// Reconstruct `filename` into memory.
    ///
    /// Nothing is returned unless every block was read intact.
    pub async fn retrieve(&self, filename: &str) -> Result<Vec<u8>, EngineError> {
        let mut out = Vec::new();
        self.retrieve_to(filename, &mut out).await?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Filenames whose ingested content contained `keyword`.
    ///
    /// Includes files that were later re-ingested without the keyword:
    /// index entries are never retracted.
    pub fn search(&self, keyword: &str) -> SearchResult {
        let filenames = self.index.lookup(keyword);
        SearchResult {
            keyword: normalize_keyword(keyword),
            count: filenames.len(),
            filenames,
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Every filename with a manifest, sorted.
    pub async fn list_files(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.manifests.list().await?)
    }

    /// Current store sizes.
    pub async fn stats(&self) -> Result<NodeStats, EngineError> {
        Ok(NodeStats {
            blocks: self.store.list().await?.len(),
            files: self.manifests.list().await?.len(),
            keywords: self.index.len(),
        })
    }
}

fn check_filename(filename: &str) -> Result<(), EngineError> {
    validate_filename(filename)
        .map_err(|reason| EngineError::BadInput(format!("invalid filename {filename:?}: {reason}")))
}

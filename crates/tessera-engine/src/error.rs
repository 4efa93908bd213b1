//! Error types for the engine.

use tessera_types::BlockKey;

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing content or an unusable filename.
    BadInput,
    /// No manifest for the requested filename.
    NotFound,
    /// A manifest references a block the store does not have.
    MissingBlock,
    /// Underlying read/write failure.
    StorageIo,
    /// Stored data could not be read back intact.
    CorruptRead,
}

impl ErrorKind {
    /// Whether the caller can fix the request and retry.
    ///
    /// Everything else is a server-side fault.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::BadInput | Self::NotFound)
    }
}

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request was unusable as given.
    #[error("bad input: {0}")]
    BadInput(String),

    /// File was never (successfully) ingested.
    #[error("file not found: {filename}")]
    NotFound {
        /// Requested filename.
        filename: String,
    },

    /// The manifest names a block that is absent from the block store.
    #[error("manifest for {filename} references missing block {key}")]
    MissingBlock {
        /// File being reconstructed.
        filename: String,
        /// The absent block.
        key: BlockKey,
    },

    /// A stored block no longer matches its key.
    #[error("block {key} is corrupt (reads back as {actual})")]
    CorruptRead {
        /// The requested block.
        key: BlockKey,
        /// Digest of the bytes actually read.
        actual: BlockKey,
    },

    /// Failed to access the block store.
    #[error("store error: {0}")]
    Store(#[from] tessera_store::StoreError),

    /// Failed to access the manifest store.
    #[error("metadata error: {0}")]
    Meta(tessera_meta::MetaError),

    /// Reading the upload stream failed.
    #[error("upload error: {0}")]
    Upload(#[from] tessera_cas::CasError),

    /// Writing the reconstructed stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use tessera_meta::MetaError;

        match self {
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MissingBlock { .. } => ErrorKind::MissingBlock,
            Self::CorruptRead { .. } => ErrorKind::CorruptRead,
            Self::Meta(MetaError::Malformed { .. }) => ErrorKind::CorruptRead,
            Self::Store(_) | Self::Meta(_) | Self::Upload(_) | Self::Io(_) => ErrorKind::StorageIo,
        }
    }
}

impl From<tessera_meta::MetaError> for EngineError {
    fn from(e: tessera_meta::MetaError) -> Self {
        use tessera_meta::MetaError;

        match e {
            MetaError::NotFound(filename) => Self::NotFound { filename },
            MetaError::InvalidName { name, reason } => {
                Self::BadInput(format!("invalid filename {name:?}: {reason}"))
            }
            other => Self::Meta(other),
        }
    }
}

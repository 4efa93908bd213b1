//! Error types for block storage operations.

use tessera_types::BlockKey;

/// Errors that can occur during block storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(BlockKey),

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Block data read back does not match its content-addressed key.
    ///
    /// Covers truncated files as well as bit rot and tampering.
    #[error("block corruption detected: expected {expected}, actual hash {actual}")]
    CorruptBlock {
        /// The key that was requested.
        expected: BlockKey,
        /// The key computed from the data actually read.
        actual: BlockKey,
    },
}

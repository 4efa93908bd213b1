//! Error types for chunking operations.

/// Errors that can occur while chunking an input stream.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// The underlying reader failed before end-of-stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

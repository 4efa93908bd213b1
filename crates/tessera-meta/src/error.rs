//! Error types for the manifest store.

use tessera_types::{FilenameError, ParseKeyError};

/// Errors returned by [`ManifestStore`](crate::ManifestStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// No manifest is recorded for the filename.
    #[error("no manifest for {0:?}")]
    NotFound(String),

    /// The filename cannot be used as a manifest locator.
    #[error("invalid filename {name:?}: {reason}")]
    InvalidName {
        /// The rejected filename.
        name: String,
        /// Why it was rejected.
        reason: FilenameError,
    },

    /// A manifest line is not a block key.
    #[error("malformed manifest for {filename:?} at line {line}: {source}")]
    Malformed {
        /// Filename whose manifest failed to parse.
        filename: String,
        /// 1-based line number.
        line: usize,
        /// The parse failure.
        source: ParseKeyError,
    },

    /// I/O error while reading or writing a manifest file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

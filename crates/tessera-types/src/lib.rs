//! Shared types and identifiers for Tessera.
//!
//! This crate defines the content-addressed [`BlockKey`], the filename
//! rules every storage locator derived from user input must satisfy
//! ([`validate_filename`]), and the workspace-wide defaults.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Default maximum block size: 1 MiB.
pub const DEFAULT_BLOCK_SIZE: u32 = 1024 * 1024;

/// Longest filename accepted as a manifest locator, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

// ---------------------------------------------------------------------------
// BlockKey
// ---------------------------------------------------------------------------

/// Content-addressed identifier for a block: `sha256(block_data)`.
///
/// Displays as 64 lowercase hex characters, which is also the block's
/// on-disk file name and its line in a manifest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct BlockKey([u8; 32]);

impl BlockKey {
    /// Create a key by hashing block data with SHA-256.
    pub fn from_data(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Return the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for BlockKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for BlockKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockKey({self})")
    }
}

/// Error returned when parsing a [`BlockKey`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid block key {input:?}: expected 64 hex characters")]
pub struct ParseKeyError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for BlockKey {
    type Err = ParseKeyError;

    /// Parse 64 hex characters. Uppercase digits are accepted; the key
    /// always displays lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseKeyError {
            input: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Why a filename was refused as a storage locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    /// Empty string.
    #[error("filename is empty")]
    Empty,
    /// Longer than [`MAX_FILENAME_LEN`] bytes.
    #[error("filename exceeds {MAX_FILENAME_LEN} bytes")]
    TooLong,
    /// `.`, `..`, or a leading dot (reserved for temp files).
    #[error("filename may not start with '.'")]
    Dotted,
    /// Contains a path separator.
    #[error("filename may not contain path separators")]
    Separator,
    /// Contains NUL or another control character.
    #[error("filename may not contain control characters")]
    Control,
}

/// Check that `name` is safe to use as a manifest locator.
///
/// Filenames arrive from untrusted upload input and are joined onto the
/// manifest directory, so anything that could escape it or alias another
/// entry is refused.
pub fn validate_filename(name: &str) -> Result<(), FilenameError> {
    if name.is_empty() {
        return Err(FilenameError::Empty);
    }
    if name.len() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }
    if name.starts_with('.') {
        return Err(FilenameError::Dotted);
    }
    if name.contains(['/', '\\']) {
        return Err(FilenameError::Separator);
    }
    if name.chars().any(char::is_control) {
        return Err(FilenameError::Control);
    }
    Ok(())
}

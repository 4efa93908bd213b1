//! Content-addressed block storage.
//!
//! This crate defines the [`BlockStore`] trait for persisting opaque blocks
//! keyed by their SHA-256 digest, along with two concrete backends:
//!
//! - [`MemoryStore`]: in-memory storage backed by a `RwLock<HashMap>`.
//! - [`FileStore`]: one file per block, named by its hex digest.
//!
//! Both dedup on write: storing bytes whose key is already present is a
//! no-op that still returns the key.

mod error;
mod file_store;
mod memory_store;
mod traits;

pub use error::StoreError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use traits::BlockStore;

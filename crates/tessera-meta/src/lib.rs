//! Manifest persistence: filename → ordered block keys.
//!
//! [`ManifestStore`] records, for every successfully ingested filename, the
//! ordered list of [`BlockKey`](tessera_types::BlockKey)s whose concatenated
//! bytes reproduce the upload. Two backends are provided:
//!
//! - [`FileManifestStore`]: `{dir}/{filename}.txt`, one hex key per line.
//! - [`MemoryManifestStore`]: a `RwLock<HashMap>` for tests and memory mode.
//!
//! A save fully replaces any previous manifest for the same filename, and a
//! concurrent load sees either the old list or the new one, never a mix.

mod error;
mod file_store;
mod memory_store;
mod traits;

pub use error::MetaError;
pub use file_store::FileManifestStore;
pub use memory_store::MemoryManifestStore;
pub use traits::ManifestStore;

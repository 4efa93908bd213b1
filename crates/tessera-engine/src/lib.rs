//! Node orchestrator tying all Tessera components together.
//!
//! The [`TesseraNode`] owns the block store, manifest store and keyword
//! index, and exposes the three data-plane operations: ingest, retrieve
//! and keyword search. It is built once at startup and shared as an
//! `Arc<TesseraNode>` by every request handler.

pub mod error;
pub mod node;

pub use error::{EngineError, ErrorKind};
pub use node::{IngestReceipt, NodeStats, SearchResult, TesseraNode, TesseraNodeConfig};
pub use tessera_types::DEFAULT_BLOCK_SIZE;

#[cfg(test)]
mod tests;

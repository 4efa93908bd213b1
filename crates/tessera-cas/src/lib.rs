//! Content addressing and fixed-size chunking.
//!
//! This crate provides:
//! - [`Chunker`]: splits data into fixed-size blocks, each identified by its SHA-256 digest.
//! - [`BlockStream`]: the lazy, single-pass block sequence over an async reader.

mod chunker;
mod error;

pub use chunker::{Block, BlockStream, Chunker};
pub use error::CasError;

//! Fixed-size chunker for splitting data into content-addressed blocks.

use bytes::Bytes;
use tessera_types::BlockKey;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CasError;

/// A single block of data with its content-addressed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Content-addressed identifier: `sha256(data)`.
    pub key: BlockKey,
    /// Byte offset within the original upload.
    pub offset: u64,
    /// The raw block data.
    pub data: Bytes,
}

impl Block {
    fn new(offset: u64, data: Bytes) -> Self {
        Self {
            key: BlockKey::from_data(&data),
            offset,
            data,
        }
    }
}

/// Fixed-size chunker that splits data into blocks of a configured size.
///
/// Every block but the last is exactly `block_size` bytes; the last may be
/// smaller. Empty data produces zero blocks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    block_size: u32,
}

impl Chunker {
    /// Create a new chunker with the given block size in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn new(block_size: u32) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self { block_size }
    }

    /// The configured maximum block size.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Split an in-memory slice into blocks.
    pub fn chunk(&self, data: &[u8]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut offset = 0u64;

        for slice in data.chunks(self.block_size as usize) {
            blocks.push(Block::new(offset, Bytes::copy_from_slice(slice)));
            offset += slice.len() as u64;
        }

        blocks
    }

    /// Start a lazy block sequence over an async reader.
    ///
    /// Nothing is read until [`BlockStream::next_block`] is polled.
    pub fn blocks<R>(&self, reader: R) -> BlockStream<R>
    where
        R: AsyncRead + Unpin,
    {
        BlockStream {
            reader,
            block_size: self.block_size as usize,
            offset: 0,
            done: false,
        }
    }
}

/// Lazy, single-pass sequence of blocks read from an [`AsyncRead`].
///
/// Once the reader hits end-of-stream or fails, the stream is finished and
/// every further call yields `Ok(None)`.
pub struct BlockStream<R> {
    reader: R,
    block_size: usize,
    offset: u64,
    done: bool,
}

impl<R> BlockStream<R>
where
    R: AsyncRead + Unpin,
{
    /// Read the next block.
    ///
    /// Short reads are accumulated until a full block is buffered or the
    /// reader reports EOF. On a read error the partially filled block is
    /// dropped and the error returned.
    pub async fn next_block(&mut self) -> Result<Option<Block>, CasError> {
        if self.done {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.block_size];
        let mut filled = 0;

        while filled < self.block_size {
            let n = match self.reader.read(&mut buf[filled..]).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Err(CasError::Io(e));
                }
            };
            if n == 0 {
                self.done = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        let block = Block::new(self.offset, Bytes::from(buf));
        self.offset += filled as u64;
        Ok(Some(block))
    }

    /// Total bytes handed out as blocks so far.
    pub fn bytes_read(&self) -> u64 {
        self.offset
    }
}

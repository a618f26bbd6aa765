//! Reusable chunk buffer for bounded-memory copies.

use std::io::{Read, Write};

use crate::{Error, Result};

/// Default chunk size used when streaming raw payloads.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// A growable copy buffer that tracks its own capacity.
///
/// The buffer is sized to the chunk being copied: full chunks use
/// `chunk_size` bytes, the final chunk of a stream shrinks the allocation to
/// the remainder. Reusing the buffer for the next stream grows it back.
/// Growth goes through `try_reserve_exact`, so an allocation failure surfaces
/// as [`Error::Allocation`] instead of aborting the process.
#[derive(Debug)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    chunk_size: usize,
}

impl ChunkBuffer {
    /// Create a buffer with the default 512-byte chunk size.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create a buffer with a custom chunk size (at least one byte).
    ///
    /// No memory is allocated until the first copy.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            data: Vec::new(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Configured full-chunk size.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Current length of the chunk held by the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer currently holds no chunk.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Resize the buffer to exactly `len` bytes.
    fn resize(&mut self, len: usize) -> Result<()> {
        let current = self.data.len();

        if len > current {
            self.data
                .try_reserve_exact(len - current)
                .map_err(|source| Error::Allocation {
                    requested: len,
                    source,
                })?;
            self.data.resize(len, 0);
        } else if len < current {
            self.data.truncate(len);
            self.data.shrink_to(len);
        }

        Ok(())
    }

    /// Copy exactly `total` bytes from `reader` to `writer`, one chunk at a time.
    ///
    /// Returns the number of chunks written. A short read is an I/O error.
    pub fn copy_exact<R, W>(&mut self, reader: &mut R, writer: &mut W, total: u64) -> Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut remaining = total;
        let mut chunks = 0;

        while remaining > 0 {
            let chunk = remaining.min(self.chunk_size as u64) as usize;
            self.resize(chunk)?;

            reader.read_exact(&mut self.data)?;
            writer.write_all(&self.data)?;

            remaining -= chunk as u64;
            chunks += 1;
        }

        Ok(chunks)
    }
}

impl Default for ChunkBuffer {
    fn default() -> Self {
        Self::new()
    }
}

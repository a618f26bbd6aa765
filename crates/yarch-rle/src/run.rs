//! The on-disk run record.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use yarch_common::WriteExt;

use crate::{Error, Result};

/// Size of one encoded run: one byte plus an `i64` length.
pub const RUN_SIZE: usize = 9;

/// A maximal run of identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// The repeated byte.
    pub byte: u8,
    /// Number of repetitions, at least one.
    pub len: u64,
}

impl Run {
    /// Create a run of `len` copies of `byte`.
    #[inline]
    pub const fn new(byte: u8, len: u64) -> Self {
        Self { byte, len }
    }

    /// Write the run in its 9-byte stored form.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.byte)?;
        writer.write_len("run length", self.len)?;
        Ok(())
    }

    /// Read a run in its 9-byte stored form.
    ///
    /// `index` is only used for error reporting.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, index: u64) -> Result<Self> {
        let byte = reader.read_u8()?;
        let length = reader.read_i64::<LittleEndian>()?;

        if length <= 0 {
            return Err(Error::InvalidRun { index, length });
        }

        Ok(Self::new(byte, length as u64))
    }
}

/// Iterate over `(byte, span)` pairs of consecutive identical bytes.
pub(crate) fn spans(data: &[u8]) -> impl Iterator<Item = (u8, usize)> + '_ {
    let mut rest = data;

    std::iter::from_fn(move || {
        let &first = rest.first()?;
        let span = rest
            .iter()
            .position(|&b| b != first)
            .unwrap_or(rest.len());
        rest = &rest[span..];
        Some((first, span))
    })
}

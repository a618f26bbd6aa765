//! Run-length decoding.
//!
//! Decoding is bounded by the number of output bytes, never by a run count.
//! The runs of one stored file sum exactly to its raw length, so stopping at
//! that length leaves a payload cursor at the first run of the next file.

use std::io::{Read, Write};

use yarch_common::DEFAULT_CHUNK_SIZE;

use crate::{Error, Result, Run, RUN_SIZE};

/// Decode `runs` into exactly `expected_len` bytes.
///
/// Stops consuming runs once `expected_len` bytes have been produced. A run
/// that would cross `expected_len`, or running out of runs early, is an
/// error.
pub fn decode(runs: &[Run], expected_len: u64) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut produced = 0u64;
    let mut runs = runs.iter().enumerate();

    while produced < expected_len {
        let (index, run) = runs.next().ok_or_else(|| Error::Truncated {
            expected: expected_len,
            produced,
        })?;
        let end = checked_end(index as u64, run, produced, expected_len)?;

        let additional = (end - produced) as usize;
        output
            .try_reserve_exact(additional)
            .map_err(|source| yarch_common::Error::Allocation {
                requested: additional,
                source,
            })?;
        output.resize(output.len() + additional, run.byte);
        produced = end;
    }

    Ok(output)
}

fn checked_end(index: u64, run: &Run, produced: u64, expected: u64) -> Result<u64> {
    if run.len == 0 {
        return Err(Error::InvalidRun { index, length: 0 });
    }

    match produced.checked_add(run.len) {
        Some(end) if end <= expected => Ok(end),
        _ => Err(Error::Overrun {
            index,
            expected,
            end: produced.saturating_add(run.len),
        }),
    }
}

/// Streaming run-length decoder over stored runs.
#[derive(Debug)]
pub struct RleDecoder<R: Read> {
    inner: R,
    runs_read: u64,
}

impl<R: Read> RleDecoder<R> {
    /// Create a decoder reading stored runs from `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            runs_read: 0,
        }
    }

    /// Read the next stored run.
    pub fn read_run(&mut self) -> Result<Run> {
        let run = Run::read_from(&mut self.inner, self.runs_read)?;
        self.runs_read += 1;
        Ok(run)
    }

    /// Expand runs into `output` until exactly `expected_len` bytes are written.
    ///
    /// Returns the number of stored bytes consumed from the inner reader.
    pub fn decode_into<W: Write + ?Sized>(
        &mut self,
        output: &mut W,
        expected_len: u64,
    ) -> Result<u64> {
        let start = self.runs_read;
        let mut produced = 0u64;

        while produced < expected_len {
            let index = self.runs_read;
            let run = self.read_run()?;
            let end = checked_end(index, &run, produced, expected_len)?;

            write_repeated(output, run.byte, run.len)?;
            produced = end;
        }

        Ok((self.runs_read - start) * RUN_SIZE as u64)
    }

    /// Number of runs read so far.
    #[inline]
    pub fn runs_read(&self) -> u64 {
        self.runs_read
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Write `count` copies of `byte` using a fixed-size fill block.
fn write_repeated<W: Write + ?Sized>(output: &mut W, byte: u8, count: u64) -> std::io::Result<()> {
    let fill = [byte; DEFAULT_CHUNK_SIZE];
    let mut remaining = count;

    while remaining > 0 {
        let n = remaining.min(DEFAULT_CHUNK_SIZE as u64) as usize;
        output.write_all(&fill[..n])?;
        remaining -= n as u64;
    }

    Ok(())
}

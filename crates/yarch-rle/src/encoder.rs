//! Run-length encoding.

use std::io::{self, Write};

use crate::run::spans;
use crate::{Error, Result, Run, RUN_SIZE};

/// Encode `data` into maximal runs.
///
/// Empty input produces no runs.
pub fn encode(data: &[u8]) -> Vec<Run> {
    spans(data)
        .map(|(byte, span)| Run::new(byte, span as u64))
        .collect()
}

/// Streaming run-length encoder.
///
/// Bytes are accepted in arbitrary pieces; a run is written to the inner
/// writer as soon as a different byte arrives, and the last run is written by
/// [`finish`](Self::finish). The open run is never written by `flush`, since
/// more identical bytes may still follow.
#[derive(Debug)]
pub struct RleEncoder<W: Write> {
    inner: W,
    current: Option<Run>,
    runs_written: u64,
    bytes_in: u64,
}

impl<W: Write> RleEncoder<W> {
    /// Create an encoder writing runs to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current: None,
            runs_written: 0,
            bytes_in: 0,
        }
    }

    /// Feed more input bytes.
    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        for (byte, span) in spans(data) {
            match self.current.as_mut().filter(|run| run.byte == byte) {
                Some(run) => run.len += span as u64,
                None => {
                    self.emit_current()?;
                    self.current = Some(Run::new(byte, span as u64));
                }
            }
        }

        self.bytes_in += data.len() as u64;
        Ok(())
    }

    /// Write the pending run and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.emit_current()?;
        Ok(self.inner)
    }

    /// Number of runs written to the inner writer so far.
    #[inline]
    pub fn runs_written(&self) -> u64 {
        self.runs_written
    }

    /// Number of input bytes accepted so far.
    #[inline]
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Stored length once [`finish`](Self::finish) has written the pending run.
    #[inline]
    pub fn stored_len(&self) -> u64 {
        (self.runs_written + u64::from(self.current.is_some())) * RUN_SIZE as u64
    }

    /// Get a reference to the inner writer.
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn emit_current(&mut self) -> Result<()> {
        if let Some(run) = self.current.take() {
            run.write_to(&mut self.inner)?;
            self.runs_written += 1;
        }
        Ok(())
    }
}

impl<W: Write> Write for RleEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf).map_err(|e| match e {
            Error::Io(e) => e,
            other => io::Error::other(other),
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

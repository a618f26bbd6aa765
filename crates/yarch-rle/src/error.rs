//! Error types for the run-length codec.

use thiserror::Error;
use yarch_common::ErrorKind;

/// Errors that can occur while encoding or decoding runs.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] yarch_common::Error),

    /// A run length of zero or less.
    #[error("invalid run length {length} in run {index}")]
    InvalidRun { index: u64, length: i64 },

    /// A run extends past the expected output length.
    #[error("run {index} overruns expected output: {expected} bytes expected, run ends at {end}")]
    Overrun { index: u64, expected: u64, end: u64 },

    /// The runs ended before the expected output length was produced.
    #[error("runs ended early: {expected} bytes expected, {produced} produced")]
    Truncated { expected: u64, produced: u64 },
}

impl Error {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Common(e) => e.kind(),
            _ => ErrorKind::IoFailure,
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

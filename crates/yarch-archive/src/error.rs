//! Error types for the archive crate.

use std::path::PathBuf;

use thiserror::Error;
use yarch_common::ErrorKind;

/// Errors that can occur when writing or extracting containers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] yarch_common::Error),

    /// Run-length codec error.
    #[error("RLE payload: {0}")]
    Rle(#[from] yarch_rle::Error),

    /// The header section is inconsistent.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// A source file's size differs between the header and payload passes.
    #[error(
        "'{}' changed size while archiving: header records {recorded} bytes, read {actual}",
        path.display()
    )]
    SizeChanged {
        path: PathBuf,
        recorded: u64,
        actual: u64,
    },

    /// A source path has nothing after its last separator.
    #[error("no file name in source path '{}'", .0.display())]
    NoBasename(PathBuf),
}

impl Error {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Common(e) => e.kind(),
            Self::Rle(e) => e.kind(),
            Self::NoBasename(_) => ErrorKind::PathFailure,
            Self::Io(_) | Self::CorruptHeader(_) | Self::SizeChanged { .. } => ErrorKind::IoFailure,
        }
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

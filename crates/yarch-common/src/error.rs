//! Error types for yarch-common.

use std::collections::TryReserveError;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse classification of a failure.
///
/// Every error in the workspace maps to exactly one kind. The CLI turns the
/// kind into a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A path was missing, not permitted, or otherwise could not be opened.
    OpenFailure,
    /// A seek, read or write failed or returned an unexpected count or position.
    IoFailure,
    /// A buffer could not grow to the requested size.
    AllocationFailure,
    /// A destination path or stored filename was rejected.
    PathFailure,
}

impl ErrorKind {
    /// Process exit code for this kind. Code 1 is reserved for argument errors.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::OpenFailure => 2,
            Self::IoFailure => 3,
            Self::AllocationFailure => 4,
            Self::PathFailure => 5,
        }
    }
}

/// Common error type for yarch operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened or created.
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer growth failed.
    #[error("cannot allocate {requested} bytes: {source}")]
    Allocation {
        requested: usize,
        source: TryReserveError,
    },

    /// Rejected path.
    #[error("invalid path: {0}")]
    Path(String),

    /// A stored length field was negative.
    #[error("negative {field}: {value}")]
    NegativeLength { field: &'static str, value: i64 },

    /// A length does not fit in the signed on-disk field.
    #[error("{field} too large to store: {value}")]
    LengthOverflow { field: &'static str, value: u64 },
}

impl Error {
    /// Build an [`Error::Open`] for `path`.
    pub fn open(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } => ErrorKind::OpenFailure,
            Self::Io(_) | Self::NegativeLength { .. } | Self::LengthOverflow { .. } => {
                ErrorKind::IoFailure
            }
            Self::Allocation { .. } => ErrorKind::AllocationFailure,
            Self::Path(_) => ErrorKind::PathFailure,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            ErrorKind::OpenFailure.exit_code(),
            ErrorKind::IoFailure.exit_code(),
            ErrorKind::AllocationFailure.exit_code(),
            ErrorKind::PathFailure.exit_code(),
        ];

        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            assert_ne!(*a, 1);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_kind_mapping() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(Error::open("nope", missing).kind(), ErrorKind::OpenFailure);

        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(Error::from(eof).kind(), ErrorKind::IoFailure);

        assert_eq!(Error::Path("".into()).kind(), ErrorKind::PathFailure);
        assert_eq!(
            Error::NegativeLength {
                field: "payload_len",
                value: -1
            }
            .kind(),
            ErrorKind::IoFailure
        );
    }
}

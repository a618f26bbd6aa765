//! Common utilities for yarch.
//!
//! This crate provides the plumbing shared by the codec and archive crates:
//!
//! - [`Error`] and [`ErrorKind`] - error values and the coarse failure class
//!   callers map to exit codes
//! - [`ReadExt`], [`WriteExt`], [`SeekExt`] - little-endian field I/O on streams
//! - [`ChunkBuffer`] - reusable, capacity-tracked copy buffer
//! - [`path`] - basename extraction and destination normalization

mod buffer;
mod error;
mod stream;

pub mod path;

pub use buffer::{ChunkBuffer, DEFAULT_CHUNK_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use stream::{ReadExt, SeekExt, WriteExt};

/// Re-export of the bound on [`ReadExt::read_struct`].
pub use zerocopy::FromBytes;

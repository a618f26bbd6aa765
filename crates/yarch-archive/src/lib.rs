//! yarch container writer and extractor.
//!
//! A container is a header section listing every file's raw length and
//! basename, followed by a payload section holding the files' bytes back to
//! back, either verbatim or run-length encoded. See [`format`] for the exact
//! layout.
//!
//! - [`write_archive`] packs files into a new container
//! - [`extract_archive`] unpacks a container into a directory
//! - [`ArchiveReader::entries`] lists a container without reading payloads
//!
//! The payload encoding is not recorded in the container; extraction must
//! use the same [`Encoding`] the writer used.
//!
//! # Example
//!
//! ```no_run
//! use yarch_archive::{extract_archive, write_archive, Encoding};
//!
//! write_archive("bundle.yarch", &["notes/a.txt", "b.bin"], Encoding::Rle)?;
//! extract_archive("bundle.yarch", "/tmp/out", Encoding::Rle)?;
//! # Ok::<(), yarch_archive::Error>(())
//! ```

mod entry;
mod error;
mod reader;
mod writer;

pub mod format;

pub use entry::Entry;
pub use error::{Error, Result};
pub use format::{header_size_for, ArchiveSummary, Encoding};
pub use reader::{extract_archive, ArchiveReader, ExtractOptions};
pub use writer::{write_archive, write_archive_with, ArchiveWriter};

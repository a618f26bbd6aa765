//! yarch - pack files into a single container and unpack them again.
//!
//! This crate provides a unified interface to the yarch crates.
//!
//! # Crates
//!
//! - [`yarch_common`] - Error kinds, stream helpers, chunk buffer, paths
//! - [`yarch_rle`] - Run-length codec for payloads
//! - [`yarch_archive`] - Container writer and extractor
//!
//! # Example
//!
//! ```no_run
//! use yarch::prelude::*;
//!
//! let summary = write_archive("bundle.yarch", &["a.txt", "logs/b.log"], Encoding::Raw)?;
//! println!("{} files, {} bytes", summary.files, summary.archive_len());
//!
//! let mut reader = ArchiveReader::open("bundle.yarch")?;
//! for entry in reader.entries()? {
//!     println!("{} ({} bytes)", entry.name_lossy(), entry.payload_len());
//! }
//! reader.extract_to("/tmp/out", ExtractOptions::new(Encoding::Raw))?;
//! # Ok::<(), yarch::archive::Error>(())
//! ```

// Re-export all sub-crates
pub use yarch_archive as archive;
pub use yarch_common as common;
pub use yarch_rle as rle;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use yarch_archive::{
        extract_archive, write_archive, write_archive_with, ArchiveReader, ArchiveSummary,
        ArchiveWriter, Encoding, Entry, ExtractOptions,
    };
    pub use yarch_common::ErrorKind;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

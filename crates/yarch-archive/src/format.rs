//! Container layout.
//!
//! ```text
//! |--------------|-
//! | header_size  | \   i64, offset of the first payload byte
//! | files_count  |  \  i64
//! |--------------|   \
//! | payload_len  |    | HEADER SECTION, one entry per file:
//! | filename_len |   /    i64 raw length, u64 name length,
//! | filename     |  /     name bytes without terminator
//! |     ...      | /
//! |--------------|-
//! | payload 0    | \  PAYLOAD SECTION, raw bytes or 9-byte
//! |     ...      | /  runs, in entry order, no padding
//! |--------------|-
//! ```
//!
//! All integers are little-endian. There is no magic number or version
//! field, and whether payloads are raw or run-length encoded is not
//! recorded: the reader must be told.

use zerocopy::byteorder::little_endian::I64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

/// Size of the two leading fields.
pub const PREAMBLE_SIZE: u64 = 16;

/// Size of the fixed part of an entry (`payload_len` + `filename_len`).
pub const ENTRY_FIXED_SIZE: u64 = 16;

/// The two fields at offset 0.
///
/// Written last by the writer, once the header length is known.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Preamble {
    /// Offset of the payload section.
    pub header_size: I64,
    /// Number of entries.
    pub files_count: I64,
}

impl Preamble {
    /// Build a preamble, checking both values fit the signed fields.
    pub fn new(header_size: u64, files_count: u64) -> Result<Self> {
        Ok(Self {
            header_size: I64::new(to_signed("header_size", header_size)?),
            files_count: I64::new(to_signed("files_count", files_count)?),
        })
    }

    /// Offset of the payload section.
    pub fn header_size(&self) -> Result<u64> {
        to_unsigned("header_size", self.header_size.get())
    }

    /// Number of entries.
    pub fn files_count(&self) -> Result<u64> {
        to_unsigned("files_count", self.files_count.get())
    }
}

fn to_signed(field: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| yarch_common::Error::LengthOverflow { field, value }.into())
}

fn to_unsigned(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| yarch_common::Error::NegativeLength { field, value }.into())
}

/// How file contents are stored in the payload section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Bytes copied verbatim.
    #[default]
    Raw,
    /// `(byte, run_length)` runs, see [`yarch_rle`].
    Rle,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Rle => f.write_str("rle"),
        }
    }
}

/// Header section length for entries with the given filename lengths.
///
/// ```
/// use yarch_archive::header_size_for;
///
/// // 16-byte preamble, then 16 + 5 and 16 + 10.
/// assert_eq!(header_size_for([5, 10]), 63);
/// ```
pub fn header_size_for<I>(name_lens: I) -> u64
where
    I: IntoIterator<Item = usize>,
{
    name_lens
        .into_iter()
        .map(|len| ENTRY_FIXED_SIZE + len as u64)
        .fold(PREAMBLE_SIZE, |acc, len| acc + len)
}

/// Totals reported by a write or an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveSummary {
    /// Number of files processed.
    pub files: u64,
    /// Length of the header section.
    pub header_size: u64,
    /// Sum of the files' raw lengths.
    pub raw_bytes: u64,
    /// Bytes occupied in the payload section.
    pub stored_bytes: u64,
}

impl ArchiveSummary {
    /// Total container length.
    #[inline]
    pub fn archive_len(&self) -> u64 {
        self.header_size + self.stored_bytes
    }
}

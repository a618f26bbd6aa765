//! Container entry.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::PathBuf;

use yarch_common::{path, ReadExt, WriteExt};

use crate::format::ENTRY_FIXED_SIZE;
use crate::{Error, Result};

/// One header record describing one stored file.
///
/// This contains metadata about the file, not the file data itself. The
/// payload of entry `i` starts right after the payloads of entries `0..i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stored filename (basename only).
    name: Vec<u8>,
    /// Raw (pre-encoding) length in bytes.
    payload_len: u64,
}

impl Entry {
    /// Create a new entry.
    pub fn new(name: impl Into<Vec<u8>>, payload_len: u64) -> Self {
        Self {
            name: name.into(),
            payload_len,
        }
    }

    /// Get the stored filename bytes.
    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Get the stored filename for display.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Get the raw length in bytes.
    #[inline]
    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    /// Bytes this entry occupies in the header section.
    #[inline]
    pub fn header_len(&self) -> u64 {
        ENTRY_FIXED_SIZE + self.name.len() as u64
    }

    /// Output path for extraction under a normalized destination directory.
    ///
    /// Fails if the stored name is not a plain basename.
    pub fn output_path(&self, normalized_dir: &OsStr) -> Result<PathBuf> {
        path::validate_name(&self.name)?;
        Ok(path::output_path(normalized_dir, &self.name)?)
    }

    /// Write the entry's header record.
    pub(crate) fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_len("payload_len", self.payload_len)?;
        writer.write_word(self.name.len() as u64)?;
        writer.write_all(&self.name)?;
        Ok(())
    }

    /// Read one header record.
    ///
    /// `header_remaining` is the number of header bytes left before the
    /// payload section; a record claiming more than that is corrupt.
    pub(crate) fn read_from<R: Read + ?Sized>(
        reader: &mut R,
        header_remaining: u64,
    ) -> Result<Self> {
        let available = header_remaining.checked_sub(ENTRY_FIXED_SIZE).ok_or_else(|| {
            Error::CorruptHeader(format!(
                "entry record needs {} bytes but only {} header bytes are left",
                ENTRY_FIXED_SIZE, header_remaining
            ))
        })?;

        let payload_len = reader.read_len("payload_len")?;
        let name_len = reader.read_word()?;

        if name_len > available {
            return Err(Error::CorruptHeader(format!(
                "filename length {} exceeds the {} header bytes left",
                name_len, available
            )));
        }

        let mut name = vec![0u8; name_len as usize];
        reader.read_exact(&mut name)?;

        Ok(Self { name, payload_len })
    }
}

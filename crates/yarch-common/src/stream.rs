//! Little-endian field I/O on streams.
//!
//! Every integer in a yarch container is little-endian. Lengths are kept as
//! `u64` in memory and stored as signed 64-bit fields, so the conversions in
//! both directions are checked here rather than at each call site.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// Trait for reading container fields from streams.
pub trait ReadExt: Read {
    /// Read a structure from the stream.
    fn read_struct<T: FromBytes>(&mut self) -> io::Result<T> {
        let size = std::mem::size_of::<T>();
        let mut bytes = vec![0u8; size];
        self.read_exact(&mut bytes)?;
        T::read_from_bytes(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{:?}", e)))
    }

    /// Read a signed 64-bit length field, rejecting negative values.
    fn read_len(&mut self, field: &'static str) -> Result<u64> {
        let value = self.read_i64::<LittleEndian>()?;
        u64::try_from(value).map_err(|_| Error::NegativeLength { field, value })
    }

    /// Read an unsigned 64-bit size word.
    fn read_word(&mut self) -> Result<u64> {
        Ok(self.read_u64::<LittleEndian>()?)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Trait for writing container fields to streams.
pub trait WriteExt: Write {
    /// Write a length as a signed 64-bit field.
    fn write_len(&mut self, field: &'static str, value: u64) -> Result<()> {
        let stored = i64::try_from(value).map_err(|_| Error::LengthOverflow { field, value })?;
        self.write_i64::<LittleEndian>(stored)?;
        Ok(())
    }

    /// Write an unsigned 64-bit size word.
    fn write_word(&mut self, value: u64) -> Result<()> {
        self.write_u64::<LittleEndian>(value)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

/// Trait for measuring seekable streams.
pub trait SeekExt: Seek {
    /// Total length of the stream.
    ///
    /// Seeks to the end, records the offset and seeks back to where the
    /// cursor was.
    fn measure_len(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if end != current {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

impl<S: Seek + ?Sized> SeekExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_len_fields_are_little_endian() {
        let mut buf = Vec::new();
        buf.write_len("header_size", 0x0102).unwrap();
        buf.write_word(3).unwrap();

        assert_eq!(buf, [0x02, 0x01, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0]);

        let mut reader = Cursor::new(buf);
        assert_eq!(reader.read_len("header_size").unwrap(), 0x0102);
        assert_eq!(reader.read_word().unwrap(), 3);
    }

    #[test]
    fn test_negative_len_rejected() {
        let mut reader = Cursor::new((-5i64).to_le_bytes());

        match reader.read_len("payload_len") {
            Err(Error::NegativeLength { field, value }) => {
                assert_eq!(field, "payload_len");
                assert_eq!(value, -5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_len_overflow_rejected() {
        let mut buf = Vec::new();
        assert!(matches!(
            buf.write_len("payload_len", u64::MAX),
            Err(Error::LengthOverflow { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_measure_len_restores_position() {
        let mut cursor = Cursor::new(vec![0u8; 40]);
        cursor.set_position(7);

        assert_eq!(cursor.measure_len().unwrap(), 40);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_eof_error() {
        let mut reader = Cursor::new([0x01, 0x02]);
        assert!(matches!(reader.read_word(), Err(Error::Io(_))));
    }
}

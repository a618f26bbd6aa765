//! Container reader and extractor.
//!
//! The reader keeps two independent cursors into the same container: one
//! walks the header section, the other walks the payload section. Entries
//! and payloads are consumed in the same order, so the payload cursor always
//! sits at the start of the current entry's stored bytes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use yarch_common::{path, ChunkBuffer, ReadExt, SeekExt, DEFAULT_CHUNK_SIZE};
use yarch_rle::RleDecoder;

use crate::format::{ArchiveSummary, Encoding, Preamble, ENTRY_FIXED_SIZE, PREAMBLE_SIZE};
use crate::{Entry, Error, Result};

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// How payloads were stored. Must match what the writer used.
    pub encoding: Encoding,
    /// Chunk size for raw payload copies.
    pub chunk_size: usize,
}

impl ExtractOptions {
    /// Options for `encoding` with the default chunk size.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different raw copy chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new(Encoding::Raw)
    }
}

/// Container reader with separate header and payload cursors.
pub struct ArchiveReader<R: Read + Seek> {
    header: R,
    payload: R,
    header_size: u64,
    files_count: u64,
}

impl ArchiveReader<BufReader<File>> {
    /// Open a container file, with one handle per cursor.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let header = File::open(path).map_err(|e| yarch_common::Error::open(path, e))?;
        let payload = File::open(path).map_err(|e| yarch_common::Error::open(path, e))?;

        Self::new(BufReader::new(header), BufReader::new(payload))
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Create a reader from two cursors over the same container.
    ///
    /// Reads and validates the preamble from `header`.
    pub fn new(mut header: R, mut payload: R) -> Result<Self> {
        header.seek(SeekFrom::Start(0))?;
        let preamble: Preamble = header.read_struct()?;
        let header_size = preamble.header_size()?;
        let files_count = preamble.files_count()?;

        if header_size < PREAMBLE_SIZE {
            return Err(Error::CorruptHeader(format!(
                "header size {} is smaller than the {}-byte preamble",
                header_size, PREAMBLE_SIZE
            )));
        }

        let max_entries = (header_size - PREAMBLE_SIZE) / ENTRY_FIXED_SIZE;
        if files_count > max_entries {
            return Err(Error::CorruptHeader(format!(
                "{} entries cannot fit in a {}-byte header",
                files_count, header_size
            )));
        }

        let archive_len = payload.measure_len()?;
        if archive_len < header_size {
            return Err(Error::CorruptHeader(format!(
                "header size {} is past the end of the {}-byte container",
                header_size, archive_len
            )));
        }

        payload.seek(SeekFrom::Start(header_size))?;
        debug!(header_size, files_count, archive_len, "container opened");

        Ok(Self {
            header,
            payload,
            header_size,
            files_count,
        })
    }

    /// Offset of the payload section.
    #[inline]
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    /// Number of entries.
    #[inline]
    pub fn files_count(&self) -> u64 {
        self.files_count
    }

    /// Read every entry of the header section.
    ///
    /// Only the header cursor moves. The entries must end exactly at
    /// `header_size`.
    pub fn entries(&mut self) -> Result<Vec<Entry>> {
        self.header.seek(SeekFrom::Start(PREAMBLE_SIZE))?;

        let mut entries = Vec::with_capacity(self.files_count as usize);
        let mut position = PREAMBLE_SIZE;

        for _ in 0..self.files_count {
            let entry = Entry::read_from(&mut self.header, self.header_size - position)?;
            position += entry.header_len();
            entries.push(entry);
        }

        if position != self.header_size {
            return Err(Error::CorruptHeader(format!(
                "entries end at offset {} but header size is {}",
                position, self.header_size
            )));
        }

        Ok(entries)
    }

    /// Read every entry together with its decoded contents.
    pub fn read_all(&mut self, options: ExtractOptions) -> Result<Vec<(Entry, Vec<u8>)>> {
        let entries = self.entries()?;
        self.payload.seek(SeekFrom::Start(self.header_size))?;

        let mut buffer = ChunkBuffer::with_chunk_size(options.chunk_size);
        let mut files = Vec::with_capacity(entries.len());

        for entry in entries {
            let mut data = Vec::new();
            data.try_reserve_exact(entry.payload_len() as usize)
                .map_err(|source| yarch_common::Error::Allocation {
                    requested: entry.payload_len() as usize,
                    source,
                })?;
            self.copy_payload(&entry, options.encoding, &mut buffer, &mut data)?;
            files.push((entry, data));
        }

        Ok(files)
    }

    /// Extract every entry into `destination`.
    pub fn extract_to<P: AsRef<Path>>(
        &mut self,
        destination: P,
        options: ExtractOptions,
    ) -> Result<ArchiveSummary> {
        self.extract_with(destination, options, |_, _| {})
    }

    /// Extract every entry into `destination`, calling `on_file` after each
    /// output file is complete.
    ///
    /// The directory must exist. Stored names are checked before any output
    /// file is created. A failure stops the extraction: earlier files stay,
    /// the current one may be incomplete.
    pub fn extract_with<P, F>(
        &mut self,
        destination: P,
        options: ExtractOptions,
        mut on_file: F,
    ) -> Result<ArchiveSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &Entry),
    {
        let dir = path::normalize_destination(destination.as_ref())?;
        let entries = self.entries()?;
        let targets = entries
            .iter()
            .map(|entry| entry.output_path(&dir))
            .collect::<Result<Vec<PathBuf>>>()?;

        self.payload.seek(SeekFrom::Start(self.header_size))?;

        let mut buffer = ChunkBuffer::with_chunk_size(options.chunk_size);
        let mut summary = ArchiveSummary {
            header_size: self.header_size,
            ..ArchiveSummary::default()
        };

        for (entry, target) in entries.iter().zip(&targets) {
            info!("extracting '{}'", target.display());

            let file = File::create(target).map_err(|e| yarch_common::Error::open(target, e))?;
            let mut output = BufWriter::new(file);

            summary.stored_bytes +=
                self.copy_payload(entry, options.encoding, &mut buffer, &mut output)?;
            output.flush()?;

            summary.raw_bytes += entry.payload_len();
            summary.files += 1;
            on_file(target, entry);
        }

        Ok(summary)
    }

    /// Copy the current entry's payload into `output`.
    ///
    /// Returns the stored bytes consumed from the payload cursor.
    fn copy_payload<W: Write + ?Sized>(
        &mut self,
        entry: &Entry,
        encoding: Encoding,
        buffer: &mut ChunkBuffer,
        output: &mut W,
    ) -> Result<u64> {
        match encoding {
            Encoding::Raw => {
                buffer.copy_exact(&mut self.payload, output, entry.payload_len())?;
                Ok(entry.payload_len())
            }
            Encoding::Rle => {
                let mut decoder = RleDecoder::new(&mut self.payload);
                Ok(decoder.decode_into(output, entry.payload_len())?)
            }
        }
    }
}

impl<R: Read + Seek> std::fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("header_size", &self.header_size)
            .field("files_count", &self.files_count)
            .finish()
    }
}

/// Extract every file of the container at `archive` into `destination`.
pub fn extract_archive<P, Q>(
    archive: P,
    destination: Q,
    encoding: Encoding,
) -> Result<ArchiveSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let archive = archive.as_ref();
    let summary =
        ArchiveReader::open(archive)?.extract_to(destination, ExtractOptions::new(encoding))?;

    info!(
        files = summary.files,
        "files from '{}' have been extracted",
        archive.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use yarch_common::{ErrorKind, WriteExt};

    /// Build a container by hand, independent of the writer.
    fn container(files: &[(&str, &[u8])], encoding: Encoding) -> Vec<u8> {
        let header_size = crate::header_size_for(files.iter().map(|(name, _)| name.len()));

        let mut buf = Vec::new();
        buf.write_len("header_size", header_size).unwrap();
        buf.write_len("files_count", files.len() as u64).unwrap();
        for (name, data) in files {
            Entry::new(*name, data.len() as u64).write_to(&mut buf).unwrap();
        }
        for (_, data) in files {
            match encoding {
                Encoding::Raw => buf.extend_from_slice(data),
                Encoding::Rle => {
                    for run in yarch_rle::encode(data) {
                        run.write_to(&mut buf).unwrap();
                    }
                }
            }
        }
        buf
    }

    fn reader(bytes: &[u8]) -> Result<ArchiveReader<Cursor<&[u8]>>> {
        ArchiveReader::new(Cursor::new(bytes), Cursor::new(bytes))
    }

    #[test]
    fn test_entries_and_contents_raw() {
        let bytes = container(
            &[("one", &b"first file"[..]), ("two", &b""[..]), ("three", &b"3"[..])],
            Encoding::Raw,
        );
        let mut archive = reader(&bytes).unwrap();

        assert_eq!(archive.files_count(), 3);
        let names: Vec<_> = archive
            .entries()
            .unwrap()
            .iter()
            .map(|e| e.name_lossy().into_owned())
            .collect();
        assert_eq!(names, ["one", "two", "three"]);

        let files = archive
            .read_all(ExtractOptions::new(Encoding::Raw).with_chunk_size(4))
            .unwrap();
        assert_eq!(files[0].1, b"first file");
        assert!(files[1].1.is_empty());
        assert_eq!(files[2].1, b"3");
    }

    #[test]
    fn test_rle_payload_shorter_than_raw_keeps_lockstep() {
        // The first file's runs are far shorter than its raw length. A reader
        // that loops `payload_len` times over runs would swallow the second
        // file's runs and fail here.
        let big = vec![0xAAu8; 10_000];
        let bytes = container(
            &[("big.bin", &big[..]), ("tail.txt", &b"aabbbc"[..])],
            Encoding::Rle,
        );
        let mut archive = reader(&bytes).unwrap();

        let files = archive.read_all(ExtractOptions::new(Encoding::Rle)).unwrap();
        assert_eq!(files[0].1, big);
        assert_eq!(files[1].1, b"aabbbc");
    }

    #[test]
    fn test_header_size_below_preamble_is_corrupt() {
        let mut bytes = container(&[], Encoding::Raw);
        bytes[..8].copy_from_slice(&8i64.to_le_bytes());

        assert!(matches!(reader(&bytes), Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_header_size_past_end_is_corrupt() {
        let mut bytes = container(&[("a", &b"x"[..])], Encoding::Raw);
        bytes[..8].copy_from_slice(&4096i64.to_le_bytes());

        let err = reader(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_too_many_entries_is_corrupt() {
        let mut bytes = container(&[("a", &b"x"[..])], Encoding::Raw);
        bytes[8..16].copy_from_slice(&1_000_000i64.to_le_bytes());

        assert!(matches!(reader(&bytes), Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_entries_must_end_at_header_size() {
        let mut bytes = container(&[("a", &b"xy"[..])], Encoding::Raw);
        // Claim one extra header byte: the entry now ends short of it.
        bytes[..8].copy_from_slice(&(crate::header_size_for([1]) as i64 + 1).to_le_bytes());

        let mut archive = reader(&bytes).unwrap();
        assert!(matches!(archive.entries(), Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_entry_straddling_header_end_is_corrupt() {
        // Two 10-byte names leave 12 header bytes, too few for another record.
        let mut bytes = Vec::new();
        bytes.write_len("header_size", 80).unwrap();
        bytes.write_len("files_count", 4).unwrap();
        for name in ["aaaaaaaaaa", "bbbbbbbbbb", "", ""] {
            Entry::new(name, 0).write_to(&mut bytes).unwrap();
        }

        let mut archive = reader(&bytes).unwrap();
        let err = archive.entries().unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_truncated_payload_is_io_failure() {
        let mut bytes = container(&[("a", &b"0123456789"[..])], Encoding::Raw);
        bytes.truncate(bytes.len() - 3);

        let mut archive = reader(&bytes).unwrap();
        let err = archive.read_all(ExtractOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_empty_container() {
        let bytes = container(&[], Encoding::Raw);
        let mut archive = reader(&bytes).unwrap();

        assert_eq!(archive.header_size(), PREAMBLE_SIZE);
        assert!(archive.entries().unwrap().is_empty());
    }
}

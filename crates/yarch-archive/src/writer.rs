//! Container writer.
//!
//! The header section is written before any payload, but its length is only
//! known once every entry is out. The writer therefore skips the preamble,
//! writes all entries, patches the preamble, then appends the payloads.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};
use yarch_common::{path, SeekExt};
use yarch_rle::RleEncoder;
use zerocopy::IntoBytes;

use crate::format::{ArchiveSummary, Encoding, Preamble, PREAMBLE_SIZE};
use crate::{Entry, Error, Result};

/// Writes a container to any seekable sink.
///
/// The container starts at offset 0 of the sink, which should be empty.
pub struct ArchiveWriter<W: Write + Seek> {
    inner: W,
    encoding: Encoding,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Create a writer storing payloads with `encoding`.
    pub fn new(inner: W, encoding: Encoding) -> Self {
        Self { inner, encoding }
    }

    /// Payload encoding in use.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Write a container holding `sources`, in order.
    pub fn write_files<P: AsRef<Path>>(&mut self, sources: &[P]) -> Result<ArchiveSummary> {
        self.write_files_with(sources, |_, _| {})
    }

    /// Write a container holding `sources`, calling `on_file` after each
    /// file's payload is written.
    pub fn write_files_with<P, F>(
        &mut self,
        sources: &[P],
        mut on_file: F,
    ) -> Result<ArchiveSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &Entry),
    {
        self.inner.seek(SeekFrom::Start(PREAMBLE_SIZE))?;

        let entries = self.write_header(sources)?;
        let header_size = self.finalize(entries.len() as u64)?;

        let mut summary = ArchiveSummary {
            header_size,
            ..ArchiveSummary::default()
        };

        for (source, entry) in sources.iter().zip(&entries) {
            let source = source.as_ref();
            summary.stored_bytes += self.write_payload(source, entry)?;
            summary.raw_bytes += entry.payload_len();
            summary.files += 1;
            on_file(source, entry);
        }

        self.inner.flush()?;
        Ok(summary)
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_header<P: AsRef<Path>>(&mut self, sources: &[P]) -> Result<Vec<Entry>> {
        let mut entries = Vec::with_capacity(sources.len());

        for source in sources {
            let source = source.as_ref();
            info!("archiving '{}'", source.display());

            let name = path::path_basename(source);
            if name.is_empty() {
                return Err(Error::NoBasename(source.to_path_buf()));
            }

            let mut file = open_source(source)?;
            let payload_len = file.measure_len()?;

            let entry = Entry::new(name, payload_len);
            entry.write_to(&mut self.inner)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Patch the preamble and return the header length.
    fn finalize(&mut self, files_count: u64) -> Result<u64> {
        let header_size = self.inner.stream_position()?;
        let preamble = Preamble::new(header_size, files_count)?;

        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_all(preamble.as_bytes())?;
        self.inner.seek(SeekFrom::Start(header_size))?;

        debug!(header_size, files_count, "header finalized");
        Ok(header_size)
    }

    /// Append one file's payload and return the number of bytes stored.
    fn write_payload(&mut self, source: &Path, entry: &Entry) -> Result<u64> {
        let mut reader = BufReader::new(open_source(source)?);

        let (raw, stored) = match self.encoding {
            Encoding::Raw => {
                let copied = io::copy(&mut reader, &mut self.inner)?;
                (copied, copied)
            }
            Encoding::Rle => {
                let mut encoder = RleEncoder::new(&mut self.inner);
                io::copy(&mut reader, &mut encoder)?;
                let counts = (encoder.bytes_in(), encoder.stored_len());
                encoder.finish()?;
                counts
            }
        };

        if raw != entry.payload_len() {
            return Err(Error::SizeChanged {
                path: source.to_path_buf(),
                recorded: entry.payload_len(),
                actual: raw,
            });
        }

        debug!(raw, stored, encoding = %self.encoding, "payload written");
        Ok(stored)
    }
}

impl<W: Write + Seek> std::fmt::Debug for ArchiveWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("encoding", &self.encoding)
            .finish()
    }
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| yarch_common::Error::open(path, e).into())
}

/// Pack `sources` into a new container at `output`.
///
/// Every source is opened once up front; if any cannot be opened, `output` is
/// not created or touched. Later failures leave a partial container behind.
pub fn write_archive<P, Q>(output: P, sources: &[Q], encoding: Encoding) -> Result<ArchiveSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    write_archive_with(output, sources, encoding, |_, _| {})
}

/// [`write_archive`] with a per-file callback.
pub fn write_archive_with<P, Q, F>(
    output: P,
    sources: &[Q],
    encoding: Encoding,
    on_file: F,
) -> Result<ArchiveSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(&Path, &Entry),
{
    let output = output.as_ref();

    for source in sources {
        open_source(source.as_ref())?;
    }

    let file = File::create(output).map_err(|e| yarch_common::Error::open(output, e))?;
    let mut writer = ArchiveWriter::new(BufWriter::new(file), encoding);
    let summary = writer.write_files_with(sources, on_file)?;

    writer
        .into_inner()
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;

    info!(
        files = summary.files,
        bytes = summary.archive_len(),
        "archive '{}' is ready",
        output.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    use tempfile::TempDir;

    use crate::format::header_size_for;

    fn write_sources(dir: &TempDir, files: &[(&str, &[u8])]) -> Vec<std::path::PathBuf> {
        files
            .iter()
            .map(|(name, data)| {
                let path = dir.path().join(name);
                fs::write(&path, data).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_header_size_matches_layout() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(
            &dir,
            &[("a.txt", &b"hello"[..]), ("longer-name.bin", &[0u8; 700][..])],
        );

        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), Encoding::Raw);
        let summary = writer.write_files(&sources).unwrap();
        let bytes = writer.into_inner().into_inner();

        let expected = header_size_for(["a.txt".len(), "longer-name.bin".len()]);
        assert_eq!(summary.header_size, expected);
        assert_eq!(expected, 16 + (16 + 5) + (16 + 15));

        assert_eq!(&bytes[0..8], &(expected as i64).to_le_bytes());
        assert_eq!(&bytes[8..16], &2i64.to_le_bytes());
        assert_eq!(bytes.len() as u64, expected + 705);
        assert_eq!(&bytes[expected as usize..expected as usize + 5], b"hello");
        assert_eq!(summary.archive_len(), bytes.len() as u64);
    }

    #[test]
    fn test_entries_store_basename_and_raw_len() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        let sources = write_sources(&dir, &[("a/b/c/report.txt", &b"zzzzzz"[..])]);

        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), Encoding::Rle);
        let summary = writer.write_files(&sources).unwrap();
        let bytes = writer.into_inner().into_inner();

        // Entry: raw length, name length, name.
        assert_eq!(&bytes[16..24], &6i64.to_le_bytes());
        assert_eq!(&bytes[24..32], &10u64.to_le_bytes());
        assert_eq!(&bytes[32..42], b"report.txt");

        // One run of six 'z'.
        assert_eq!(summary.stored_bytes, yarch_rle::RUN_SIZE as u64);
        assert_eq!(bytes[42], b'z');
        assert_eq!(&bytes[43..51], &6i64.to_le_bytes());
    }

    #[test]
    fn test_empty_file_entry() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(&dir, &[("empty", &b""[..])]);

        for encoding in [Encoding::Raw, Encoding::Rle] {
            let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), encoding);
            let summary = writer.write_files(&sources).unwrap();
            let bytes = writer.into_inner().into_inner();

            assert_eq!(summary.stored_bytes, 0);
            assert_eq!(&bytes[16..24], &0i64.to_le_bytes());
            assert_eq!(bytes.len() as u64, header_size_for([5]));
        }
    }

    #[test]
    fn test_no_sources() {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), Encoding::Raw);
        let summary = writer.write_files::<&str>(&[]).unwrap();
        let bytes = writer.into_inner().into_inner();

        assert_eq!(summary.files, 0);
        assert_eq!(bytes.len() as u64, PREAMBLE_SIZE);
        assert_eq!(&bytes[..8], &16i64.to_le_bytes());
    }

    #[test]
    fn test_missing_source_leaves_output_untouched() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(&dir, &[("present.txt", &b"data"[..])]);
        let missing = dir.path().join("missing.txt");
        let output = dir.path().join("out.yarch");

        let err =
            write_archive(&output, &[sources[0].clone(), missing], Encoding::Raw).unwrap_err();

        assert_eq!(err.kind(), yarch_common::ErrorKind::OpenFailure);
        assert!(!output.exists());

        fs::write(&output, b"previous contents").unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(write_archive(&output, &[missing], Encoding::Raw).is_err());
        assert_eq!(fs::read(&output).unwrap(), b"previous contents");
    }

    #[test]
    fn test_trailing_separator_has_no_basename() {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), Encoding::Raw);
        let err = writer.write_files(&["some/dir/"]).unwrap_err();

        assert!(matches!(err, Error::NoBasename(_)));
        assert_eq!(err.kind(), yarch_common::ErrorKind::PathFailure);
    }
}

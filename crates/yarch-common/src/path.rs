//! Path helpers for stored filenames and extraction targets.
//!
//! Stored filenames are raw bytes. On Unix they round-trip exactly; on other
//! platforms they must be valid UTF-8 to become a path again.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use crate::{Error, Result};

/// Destination directories must be shorter than this many bytes.
pub const MAX_DESTINATION_LEN: usize = 256;

#[inline]
fn is_separator(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

/// Everything after the last `/` or `\`, or the whole input if there is none.
///
/// Both separators are honoured on every platform so that archives built
/// from Windows-style paths strip the same way everywhere.
///
/// ```
/// use yarch_common::path::basename;
///
/// assert_eq!(basename(b"a/b/c/report.txt"), b"report.txt");
/// assert_eq!(basename(b"C:\\data\\log.bin"), b"log.bin");
/// assert_eq!(basename(b"plain"), b"plain");
/// ```
pub fn basename(path: &[u8]) -> &[u8] {
    match memchr::memrchr2(b'/', b'\\', path) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Basename of a filesystem path, as the bytes that get stored.
pub fn path_basename(path: &Path) -> &[u8] {
    basename(path.as_os_str().as_encoded_bytes())
}

/// Check that a stored filename is a plain basename.
///
/// Empty names, `.`, `..`, and names containing a separator or NUL would
/// escape or alias the destination directory and are rejected.
pub fn validate_name(name: &[u8]) -> Result<()> {
    let problem = if name.is_empty() {
        Some("empty filename")
    } else if name == b"." || name == b".." {
        Some("filename refers to a directory")
    } else if name.iter().any(|&b| is_separator(b)) {
        Some("filename contains a path separator")
    } else if memchr::memchr(0, name).is_some() {
        Some("filename contains a NUL byte")
    } else {
        None
    };

    match problem {
        Some(reason) => Err(Error::Path(format!(
            "{}: '{}'",
            reason,
            String::from_utf8_lossy(name)
        ))),
        None => Ok(()),
    }
}

/// Append a separator to `dir` unless it already ends with one.
///
/// The directory must be non-empty and shorter than
/// [`MAX_DESTINATION_LEN`] bytes.
pub fn normalize_destination(dir: &Path) -> Result<OsString> {
    let bytes = dir.as_os_str().as_encoded_bytes();

    if bytes.is_empty() {
        return Err(Error::Path("destination directory is empty".into()));
    }
    if bytes.len() >= MAX_DESTINATION_LEN {
        return Err(Error::Path(format!(
            "destination directory is {} bytes, limit is {}",
            bytes.len(),
            MAX_DESTINATION_LEN - 1
        )));
    }

    let mut normalized = dir.as_os_str().to_os_string();
    if !bytes.last().copied().is_some_and(is_separator) {
        normalized.push(MAIN_SEPARATOR_STR);
    }

    Ok(normalized)
}

/// Turn stored filename bytes back into an OS string.
#[cfg(unix)]
pub fn name_to_os(name: &[u8]) -> Result<OsString> {
    use std::os::unix::ffi::OsStrExt;

    Ok(OsStr::from_bytes(name).to_os_string())
}

/// Turn stored filename bytes back into an OS string.
#[cfg(not(unix))]
pub fn name_to_os(name: &[u8]) -> Result<OsString> {
    std::str::from_utf8(name)
        .map(|s| OsStr::new(s).to_os_string())
        .map_err(|_| {
            Error::Path(format!(
                "filename is not valid UTF-8: '{}'",
                String::from_utf8_lossy(name)
            ))
        })
}

/// Output path for a stored filename under a normalized destination.
///
/// This is plain concatenation: `normalized_dir` must come from
/// [`normalize_destination`] and `name` must pass [`validate_name`].
pub fn output_path(normalized_dir: &OsStr, name: &[u8]) -> Result<PathBuf> {
    let mut full = normalized_dir.to_os_string();
    full.push(name_to_os(name)?);
    Ok(PathBuf::from(full))
}

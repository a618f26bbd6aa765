//! Run-length codec for yarch container payloads.
//!
//! A byte stream is stored as a sequence of `(byte, run_length)` runs. Each
//! run occupies [`RUN_SIZE`] bytes on disk: the byte itself followed by the
//! run length as a little-endian `i64`.
//!
//! There is no escaping, no minimum run length and no fallback to raw bytes,
//! so input without repeats grows ninefold. Callers that care about size
//! should store such files raw.
//!
//! # Example
//!
//! ```
//! use yarch_rle::{decode, encode, Run};
//!
//! let runs = encode(b"aaab");
//! assert_eq!(runs, [Run::new(b'a', 3), Run::new(b'b', 1)]);
//!
//! let data = decode(&runs, 4)?;
//! assert_eq!(data, b"aaab");
//! # Ok::<(), yarch_rle::Error>(())
//! ```

mod decoder;
mod encoder;
mod error;
mod run;

pub use decoder::{decode, RleDecoder};
pub use encoder::{encode, RleEncoder};
pub use error::{Error, Result};
pub use run::{Run, RUN_SIZE};

/// Encoded size of `data` without encoding it.
pub fn encoded_len(data: &[u8]) -> u64 {
    run::spans(data).count() as u64 * RUN_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(b""), 0);
        assert_eq!(encoded_len(&[0xAA; 10_000]), RUN_SIZE as u64);
        // No repeats: nine stored bytes per input byte.
        assert_eq!(encoded_len(b"abcdef"), 6 * RUN_SIZE as u64);
    }

    #[test]
    fn test_stream_roundtrip() {
        let original = b"Hello, Woooorld!!! \x00\x00\x00\x00\x00 trailing zeros\x00\x00";

        let mut encoder = RleEncoder::new(Vec::new());
        // Feed in uneven pieces so runs straddle write boundaries.
        for piece in original.chunks(3) {
            encoder.push(piece).unwrap();
        }
        let encoded = encoder.finish().unwrap();
        assert_eq!(encoded.len() as u64, encoded_len(original));

        let mut decoder = RleDecoder::new(&encoded[..]);
        let mut decoded = Vec::new();
        let consumed = decoder
            .decode_into(&mut decoded, original.len() as u64)
            .unwrap();

        assert_eq!(decoded, original);
        assert_eq!(consumed, encoded.len() as u64);
    }
}

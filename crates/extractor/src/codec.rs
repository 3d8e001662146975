//! Payload decoding: store, zlib (deflate) and raw LZMA.

use crate::error::EntryError;
use flate2::read::ZlibDecoder;
use serde::Serialize;
use std::fmt;
use std::io::{Cursor, Read};

/// Header bits that select the codec.
pub const FLAGS_MASK: u8 = 0x30;

/// Leading LZMA properties: one lc/lp/pb byte plus a 4-byte dictionary size.
pub const LZMA_PROPS_SIZE: usize = 5;

/// Upper bound on the up-front output reservation, as a multiple of the input.
///
/// The declared size is untrusted; buffers grow past this only as bytes decode.
const MAX_RESERVE_RATIO: usize = 64;

/// Codec named by the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// `0x00`: zlib-wrapped deflate
    Deflate,
    /// `0x10`: LZMA properties followed by a raw LZMA stream
    Lzma,
    /// `0x20`: payload is stored as-is
    Store,
}

impl Compression {
    pub fn from_flags(flags: u8) -> Option<Self> {
        match flags & FLAGS_MASK {
            0x00 => Some(Self::Deflate),
            0x10 => Some(Self::Lzma),
            0x20 => Some(Self::Store),
            _ => None,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deflate => "deflate",
            Self::Lzma => "lzma",
            Self::Store => "store",
        };
        f.write_str(name)
    }
}

/// Decode one entry's decrypted payload to exactly `uncompressed_size` bytes.
///
/// Equal sizes or the store flag mean the payload is returned untouched.
///
/// # Errors
///
/// `Decompression` for codec failures, a length mismatch, or unknown flags.
pub fn decode(
    raw: Vec<u8>,
    compressed_size: u32,
    uncompressed_size: u32,
    flags: u8,
) -> Result<Vec<u8>, EntryError> {
    let compression = Compression::from_flags(flags);
    if compressed_size == uncompressed_size || compression == Some(Compression::Store) {
        return Ok(raw);
    }

    let expected = uncompressed_size as usize;
    let out = match compression {
        Some(Compression::Deflate) => inflate(&raw, expected)?,
        Some(Compression::Lzma) => unlzma(&raw, expected)?,
        Some(Compression::Store) => raw,
        None => {
            return Err(EntryError::Decompression(format!(
                "unrecognized compression flags {:#04x}",
                flags & FLAGS_MASK
            )))
        }
    };

    if out.len() != expected {
        return Err(EntryError::Decompression(format!(
            "expected {} bytes, decoded {}",
            expected,
            out.len()
        )));
    }
    Ok(out)
}

fn reserve(raw: &[u8], expected: usize) -> Vec<u8> {
    Vec::with_capacity(expected.min(raw.len().saturating_mul(MAX_RESERVE_RATIO)))
}

fn inflate(raw: &[u8], expected: usize) -> Result<Vec<u8>, EntryError> {
    let mut out = reserve(raw, expected);
    // One byte of slack is enough to detect an oversized stream.
    ZlibDecoder::new(raw)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| EntryError::Decompression(format!("zlib: {}", e)))?;
    Ok(out)
}

fn unlzma(raw: &[u8], expected: usize) -> Result<Vec<u8>, EntryError> {
    if raw.len() < LZMA_PROPS_SIZE {
        return Err(EntryError::Decompression(format!(
            "lzma: payload of {} bytes is shorter than the properties header",
            raw.len()
        )));
    }

    let options = lzma_rs::decompress::Options {
        unpacked_size: lzma_rs::decompress::UnpackedSize::UseProvided(Some(expected as u64)),
        ..Default::default()
    };
    let mut out = reserve(raw, expected);
    lzma_rs::lzma_decompress_with_options(&mut Cursor::new(raw), &mut out, &options)
        .map_err(|e| EntryError::Decompression(format!("lzma: {}", e)))?;
    Ok(out)
}

//! SMF header and index parsing.
//!
//! Layout, all integers little-endian `u32`:
//!
//! ```text
//! flags:u8  name_size  name[name_size]  key[4]  entry_count  base_offset
//! encrypted index blob .. base_offset
//! payload region base_offset ..
//! ```
//!
//! Each decrypted index record is
//! `name_size name[name_size] rel_offset compressed uncompressed checksum reserved[2]`.

use crate::archive::Archive;
use crate::cipher::XorKey;
use crate::codec::{Compression, FLAGS_MASK};
use crate::error::ExtractError;

/// Files shorter than this are rejected outright.
pub const MIN_HEADER_SIZE: usize = 20;

/// Fixed bytes of one index record besides the name.
const RECORD_FIXED_SIZE: usize = 4 * 4 + 2;

/// One logical file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Raw name bytes, normally a forward-slash path.
    pub name: Vec<u8>,
    /// Absolute payload offset (`base_offset + relative offset`).
    pub offset: u64,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Stored but never verified.
    pub checksum: u32,
}

impl FileEntry {
    /// Name for logs and display; invalid UTF-8 is replaced.
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Parsed header plus every index record that fit in the blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveIndex {
    /// Entries in declaration order.
    pub entries: Vec<FileEntry>,
    /// Header flag byte, already masked with [`FLAGS_MASK`].
    pub flags: u8,
    pub key: XorKey,
    /// Start of the payload region and end of the index blob.
    pub base_offset: u32,
    /// Entry count as stored in the header.
    pub declared_count: u32,
    /// Size of the encrypted index blob in bytes.
    pub index_size: usize,
    /// Record index at which the blob ran out, if it did.
    pub truncated_at: Option<u32>,
}

impl ArchiveIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codec selected by the header flags, or `None` for an unknown combination.
    pub fn compression(&self) -> Option<Compression> {
        Compression::from_flags(self.flags)
    }
}

/// Cursor over a byte slice that refuses to read past its end.
struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    fn read_bytes(&mut self, count: usize) -> Option<&'a [u8]> {
        if self.remaining() < count {
            return None;
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_bytes(N).and_then(|b| b.try_into().ok())
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }
}

fn corrupt_header(msg: impl Into<String>) -> ExtractError {
    ExtractError::CorruptHeader(msg.into())
}

/// Parse the global header and decrypt the index.
///
/// A record that runs past the end of the blob stops the scan and keeps
/// what came before it; see [`ArchiveIndex::truncated_at`].
///
/// # Errors
///
/// `CorruptHeader` if the fixed header is truncated or overlaps the index,
/// `CorruptIndex` if the index blob would extend past the end of the archive.
pub fn parse_index(archive: &Archive) -> Result<ArchiveIndex, ExtractError> {
    let data = archive.as_bytes();
    if data.len() < MIN_HEADER_SIZE {
        return Err(corrupt_header(format!(
            "file too small: {} bytes, need at least {}",
            data.len(),
            MIN_HEADER_SIZE
        )));
    }

    let mut reader = ByteReader::new(data);
    let flags = reader
        .read_u8()
        .ok_or_else(|| corrupt_header("missing flags"))?
        & FLAGS_MASK;
    let name_size = reader
        .read_u32()
        .ok_or_else(|| corrupt_header("missing name size"))? as usize;

    // name + key + entry count + base offset must all fit
    if (reader.remaining() as u64) < name_size as u64 + 12 {
        return Err(corrupt_header(format!(
            "name field of {} bytes does not fit in header",
            name_size
        )));
    }
    reader
        .read_bytes(name_size)
        .ok_or_else(|| corrupt_header("truncated name field"))?;

    let key = XorKey(
        reader
            .read_array::<4>()
            .ok_or_else(|| corrupt_header("missing key"))?,
    );
    let declared_count = reader
        .read_u32()
        .ok_or_else(|| corrupt_header("missing entry count"))?;
    let base_offset = reader
        .read_u32()
        .ok_or_else(|| corrupt_header("missing base offset"))?;

    let base = base_offset as usize;
    if base_offset as u64 > data.len() as u64 {
        return Err(ExtractError::CorruptIndex(format!(
            "base offset {} is past end of archive ({} bytes)",
            base_offset,
            data.len()
        )));
    }
    if reader.position() > base {
        return Err(corrupt_header(format!(
            "header ends at {} which is beyond base offset {}",
            reader.position(),
            base_offset
        )));
    }

    let blob = key.decrypt(&data[reader.position()..base]);
    let (entries, truncated_at) = parse_records(&blob, declared_count, base_offset);

    tracing::info!(
        flags,
        declared = declared_count,
        parsed = entries.len(),
        base_offset,
        index_size = blob.len(),
        "parsed SMF index"
    );
    if let Some(i) = truncated_at {
        tracing::warn!(index = i, "index blob truncated; keeping earlier entries");
    }

    Ok(ArchiveIndex {
        entries,
        flags,
        key,
        base_offset,
        declared_count,
        index_size: blob.len(),
        truncated_at,
    })
}

fn parse_records(blob: &[u8], declared: u32, base_offset: u32) -> (Vec<FileEntry>, Option<u32>) {
    // The count is untrusted; never reserve more than the blob could hold.
    let capacity = (declared as usize).min(blob.len() / (RECORD_FIXED_SIZE + 4));
    let mut entries = Vec::with_capacity(capacity);
    let mut reader = ByteReader::new(blob);

    for i in 0..declared {
        match read_record(&mut reader, base_offset) {
            Some(entry) => entries.push(entry),
            None => return (entries, Some(i)),
        }
    }

    (entries, None)
}

fn read_record(reader: &mut ByteReader<'_>, base_offset: u32) -> Option<FileEntry> {
    let name_size = reader.read_u32()? as usize;
    if reader.remaining() < name_size.checked_add(RECORD_FIXED_SIZE)? {
        return None;
    }

    let name = reader.read_bytes(name_size)?.to_vec();
    let relative = reader.read_u32()?;
    let compressed_size = reader.read_u32()?;
    let uncompressed_size = reader.read_u32()?;
    let checksum = reader.read_u32()?;
    reader.read_bytes(2)?;

    Some(FileEntry {
        name,
        offset: u64::from(base_offset) + u64::from(relative),
        compressed_size,
        uncompressed_size,
        checksum,
    })
}

//! Archive probing: read the index without extracting anything.

use crate::archive::Archive;
use crate::error::ExtractError;
use crate::header::{parse_index, ArchiveIndex};
use crate::types::{ArchiveInfo, EntryInfo};
use std::path::Path;

/// Probe an archive to retrieve metadata without extracting.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or its header or
/// index is corrupt.
pub fn probe_archive(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    let archive = Archive::open(path)?;
    let index = parse_index(&archive)?;
    Ok(describe(&archive, &index))
}

/// Summarize an already parsed index.
pub fn describe(archive: &Archive, index: &ArchiveIndex) -> ArchiveInfo {
    let entry_list: Vec<EntryInfo> = index
        .entries
        .iter()
        .map(|e| EntryInfo {
            path: e.display_name(),
            offset: e.offset,
            compressed_size: e.compressed_size,
            size: e.uncompressed_size,
        })
        .collect();

    ArchiveInfo {
        compression: index.compression(),
        flags: index.flags,
        entries: entry_list.len() as u64,
        declared_entries: index.declared_count,
        truncated: index.truncated_at.is_some(),
        archive_bytes: archive.len() as u64,
        compressed_bytes: entry_list.iter().map(|e| u64::from(e.compressed_size)).sum(),
        uncompressed_bytes: entry_list.iter().map(|e| u64::from(e.size)).sum(),
        entry_list,
    }
}

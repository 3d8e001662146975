//! Type definitions for SMF extraction.

use crate::codec::Compression;
use serde::Serialize;
use std::time::Duration;

/// Options for extracting an archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Worker thread count. `None` uses the detected core count (at least 2).
    pub workers: Option<usize>,
}

impl ExtractOptions {
    /// Resolved pool size; never zero.
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => num_cpus::get().max(2),
        }
    }
}

/// Individual entry within an archive.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    /// Entry name as stored, lossily decoded
    pub path: String,

    /// Absolute payload offset
    pub offset: u64,

    /// Stored (compressed) size in bytes
    pub compressed_size: u32,

    /// Decoded size in bytes
    pub size: u32,
}

/// Metadata about an SMF archive, gathered without extracting it.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveInfo {
    /// Codec named by the header flags, `None` for an unknown combination
    pub compression: Option<Compression>,

    /// Raw masked flag bits
    pub flags: u8,

    /// Number of entries that parsed successfully
    pub entries: u64,

    /// Entry count declared in the header
    pub declared_entries: u32,

    /// Whether the index ran out before the declared count
    pub truncated: bool,

    /// Size of the archive file in bytes
    pub archive_bytes: u64,

    /// Sum of all entries' stored sizes
    pub compressed_bytes: u64,

    /// Sum of all entries' decoded sizes
    pub uncompressed_bytes: u64,

    /// List of all entries in the archive
    pub entry_list: Vec<EntryInfo>,
}

/// Statistics about a completed extraction batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    /// Number of files successfully written
    pub files_extracted: u64,

    /// Number of entries that were skipped after a failure
    pub files_failed: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,

    /// Wall-clock duration of the batch (in seconds)
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }
}

//! Error types for SMF parsing and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error for a whole extraction request.
///
/// Any of these aborts before a single entry is written.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive file not found at the specified path.
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// The global header is truncated or malformed.
    #[error("Corrupt header: {0}")]
    CorruptHeader(String),

    /// The encrypted index blob cannot be located or read.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// An I/O error occurred while loading the archive or preparing the destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure scoped to a single entry.
///
/// These are logged and counted; the rest of the batch keeps going.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The entry's declared region lies outside the archive.
    #[error("Invalid offset: {offset} + {size} exceeds archive length {archive_len}")]
    InvalidOffset {
        /// Absolute payload offset
        offset: u64,
        /// Declared compressed size
        size: u64,
        /// Length of the whole archive
        archive_len: u64,
    },

    /// The codec failed or produced the wrong number of bytes.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// The destination file or one of its parent directories could not be written.
    #[error("Write error: {path}: {source}")]
    Write {
        /// Target path on disk
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The entry name would land outside the destination root.
    #[error("Unsafe path: {0}")]
    UnsafePath(#[from] SecurityError),
}

/// Entry names rejected before touching the filesystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    /// Path traversal attempt detected (e.g., "../../../etc/passwd").
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// Absolute path not allowed in archive entries.
    #[error("Absolute path not allowed: {0}")]
    AbsolutePath(String),

    /// The name has no usable components.
    #[error("Empty entry name")]
    EmptyPath,
}

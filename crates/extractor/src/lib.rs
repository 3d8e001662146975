//! # SMF Extractor
//!
//! Extraction engine for SMF archive containers.
//!
//! An SMF file is a small header, an index blob hidden with a repeating 4-byte
//! XOR key, and a region of per-entry payloads. Each payload is XOR'd with the
//! same key and then stored, zlib-compressed, or LZMA-compressed depending on
//! the header flags.
//!
//! Entries are decoded and written by a fixed pool of worker threads. The host
//! observes a running job only by polling its [`ProgressSnapshot`] and by
//! draining the [`LogSink`] it supplied.
//!
//! ## Example
//!
//! ```rust,no_run
//! use smf_extractor::{begin_extraction, open_archive, parse_index, ExtractOptions, LogBuffer};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Arc::new(open_archive(Path::new("data.smf"))?);
//! let index = Arc::new(parse_index(&archive)?);
//! let log = Arc::new(LogBuffer::new());
//!
//! let job = begin_extraction(
//!     archive,
//!     index,
//!     Path::new("output"),
//!     &ExtractOptions::default(),
//!     log.clone(),
//! )?;
//!
//! while !job.is_finished() {
//!     let progress = job.poll_progress();
//!     print!("{}", log.drain());
//!     println!("{}/{}", progress.completed, progress.total);
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//!
//! let stats = job.join();
//! println!("Extracted {} files ({} bytes)", stats.files_extracted, stats.bytes_written);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cipher;
pub mod codec;
pub mod error;
pub mod extract;
pub mod header;
pub mod probe;
pub mod progress;
pub mod safety;
pub mod types;
pub mod writer;

// Re-export main types
pub use archive::Archive;
pub use cipher::XorKey;
pub use codec::Compression;
pub use error::{EntryError, ExtractError, SecurityError};
pub use extract::{begin_extraction, ExtractionJob, JobHandle};
pub use header::{ArchiveIndex, FileEntry};
pub use progress::{LogBuffer, LogSink, NullLog, ProgressSnapshot};
pub use types::{ArchiveInfo, EntryInfo, ExtractOptions, ExtractStats};

use std::path::Path;
use std::sync::Arc;

/// Load an archive into memory.
///
/// # Errors
///
/// Returns `NotFound` or `Io` if the file cannot be read.
pub fn open_archive(path: &Path) -> Result<Archive, ExtractError> {
    Archive::open(path)
}

/// Parse the header and decrypt the index of a loaded archive.
///
/// # Errors
///
/// Returns `CorruptHeader` or `CorruptIndex`; no partial index is returned.
pub fn parse_index(archive: &Archive) -> Result<ArchiveIndex, ExtractError> {
    header::parse_index(archive)
}

/// Probe an archive to retrieve metadata without extracting.
///
/// # Errors
///
/// Returns an error if the archive is missing, unreadable, or corrupt.
pub fn probe(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    probe::probe_archive(path)
}

/// Extract an archive to `output_dir`, blocking until every entry is handled.
///
/// Per-entry failures are written to `log` and counted in
/// [`ExtractStats::files_failed`]; they do not make this function fail.
///
/// # Errors
///
/// Returns an error if the archive cannot be loaded or parsed, or the output
/// directory cannot be created.
pub fn extract(
    archive_path: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
    log: Arc<dyn LogSink>,
) -> Result<ExtractStats, ExtractError> {
    let archive = Arc::new(open_archive(archive_path)?);
    let index = Arc::new(parse_index(&archive)?);
    let job = ExtractionJob::new(archive, index, output_dir, options, log)?;
    Ok(job.run())
}

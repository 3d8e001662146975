//! Parallel extraction of every entry in an [`ArchiveIndex`].
//!
//! The queue holds every entry index before any worker starts. Workers pop
//! until it is empty; popping is the only way to obtain an index, so no two
//! workers ever touch the same entry. A supervisor joins the pool and then
//! flips the `finished` flag the host polls for.

use crate::archive::Archive;
use crate::codec;
use crate::error::{EntryError, ExtractError};
use crate::header::{ArchiveIndex, FileEntry};
use crate::progress::{LogSink, Progress, ProgressSnapshot};
use crate::types::{ExtractOptions, ExtractStats};
use crate::writer::write_entry;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Everything one batch needs, shared by reference with every worker.
pub struct ExtractionJob {
    archive: Arc<Archive>,
    index: Arc<ArchiveIndex>,
    dest: PathBuf,
    workers: usize,
    queue: Mutex<VecDeque<usize>>,
    log: Arc<dyn LogSink>,
    progress: Arc<Progress>,
    tally: Tally,
}

#[derive(Default)]
struct Tally {
    extracted: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
}

impl ExtractionJob {
    /// Prepare a batch: create the destination and fill the queue.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the destination directory cannot be created.
    pub fn new(
        archive: Arc<Archive>,
        index: Arc<ArchiveIndex>,
        dest: &Path,
        options: &ExtractOptions,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, ExtractError> {
        fs::create_dir_all(dest)?;

        let total = index.len();
        Ok(Self {
            queue: Mutex::new((0..total).collect()),
            progress: Arc::new(Progress::new(total)),
            workers: options.worker_count(),
            dest: dest.to_path_buf(),
            tally: Tally::default(),
            archive,
            index,
            log,
        })
    }

    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Run the whole batch on a scoped worker pool, blocking until every
    /// worker has exited.
    ///
    /// `finished` is set exactly once when this returns or unwinds.
    pub fn run(self) -> ExtractStats {
        let _finished = FinishOnDrop(self.progress());
        let start = Instant::now();
        self.log_header();
        tracing::info!(
            entries = self.index.len(),
            workers = self.workers,
            dest = %self.dest.display(),
            "starting extraction"
        );

        let job = &self;
        thread::scope(|s| {
            for worker in 0..job.workers {
                s.spawn(move || job.run_worker(worker));
            }
        });

        let stats = ExtractStats {
            files_extracted: self.tally.extracted.load(Ordering::Acquire),
            files_failed: self.tally.failed.load(Ordering::Acquire),
            bytes_written: self.tally.bytes.load(Ordering::Acquire),
            duration: start.elapsed(),
        };
        tracing::info!(
            extracted = stats.files_extracted,
            failed = stats.files_failed,
            bytes = stats.bytes_written,
            "extraction finished"
        );

        self.log.append_log("Extraction completed.");
        stats
    }

    /// Start the batch on a supervisor thread and return immediately.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the supervisor thread cannot be spawned.
    pub fn spawn(self) -> Result<JobHandle, ExtractError> {
        let progress = self.progress();
        let supervisor = thread::Builder::new()
            .name("smf-supervisor".to_string())
            .spawn(move || self.run())?;

        Ok(JobHandle {
            progress,
            supervisor,
        })
    }

    fn log_header(&self) {
        let source = self
            .archive
            .path()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());

        self.log.append_log(&format!("File: {}", source));
        self.log.append_log(&format!("Flags = {}", self.index.flags));
        self.log
            .append_log(&format!("Files count = {}", self.index.declared_count));
        self.log
            .append_log(&format!("Base offset = {}", self.index.base_offset));
        self.log
            .append_log(&format!("Header size = {}", self.index.index_size));
        self.log.append_log("");

        if let Some(i) = self.index.truncated_at {
            self.log.append_log(&format!(
                "Not enough data to read file entry at index {}",
                i
            ));
        }
    }

    fn next_index(&self) -> Option<usize> {
        self.queue.lock().pop_front()
    }

    fn run_worker(&self, worker: usize) {
        while let Some(idx) = self.next_index() {
            let entry = &self.index.entries[idx];

            match self.extract_entry(entry) {
                Ok((path, bytes)) => {
                    tracing::debug!(worker, idx, path = %path.display(), bytes, "entry written");
                    self.tally.extracted.fetch_add(1, Ordering::AcqRel);
                    self.tally.bytes.fetch_add(bytes, Ordering::AcqRel);
                    self.log
                        .append_log(&format!("File saved: {}", path.display()));
                }
                Err(e) => {
                    tracing::warn!(worker, idx, name = %entry.display_name(), error = %e, "entry skipped");
                    self.tally.failed.fetch_add(1, Ordering::AcqRel);
                    self.log.append_log(&failure_line(entry, &e));
                }
            }

            self.progress.complete_one();
        }
    }

    fn extract_entry(&self, entry: &FileEntry) -> Result<(PathBuf, u64), EntryError> {
        let size = u64::from(entry.compressed_size);
        let raw = self
            .archive
            .slice(entry.offset, size)
            .ok_or(EntryError::InvalidOffset {
                offset: entry.offset,
                size,
                archive_len: self.archive.len() as u64,
            })?;

        let decrypted = self.index.key.decrypt(raw);
        let data = codec::decode(
            decrypted,
            entry.compressed_size,
            entry.uncompressed_size,
            self.index.flags,
        )?;
        let path = write_entry(&self.dest, &entry.name, &data)?;

        Ok((path, data.len() as u64))
    }
}

/// Flips `finished` even if a worker or the log sink panics, so a polling
/// host always reaches `join`.
struct FinishOnDrop(Arc<Progress>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

fn failure_line(entry: &FileEntry, error: &EntryError) -> String {
    let name = entry.display_name();
    match error {
        EntryError::InvalidOffset { .. } => format!("Invalid file offset/size: {}", name),
        EntryError::Decompression(reason) => {
            format!("Failed to decompress: {} ({})", name, reason)
        }
        EntryError::Write { path, source } => {
            format!("Failed to save: {} ({})", path.display(), source)
        }
        EntryError::UnsafePath(reason) => format!("Failed to save: {} ({})", name, reason),
    }
}

/// Handle to a running batch.
pub struct JobHandle {
    progress: Arc<Progress>,
    supervisor: thread::JoinHandle<ExtractStats>,
}

impl JobHandle {
    /// `(completed, total, finished)` as of now.
    pub fn poll_progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// True once the batch is over, including when the supervisor died.
    pub fn is_finished(&self) -> bool {
        self.progress.snapshot().finished || self.supervisor.is_finished()
    }

    /// Block until every worker has exited.
    pub fn join(self) -> ExtractStats {
        match self.supervisor.join() {
            Ok(stats) => stats,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Start extracting every entry of `index` into `dest`.
///
/// # Errors
///
/// Fails only if the destination or the supervisor thread cannot be created;
/// per-entry failures go to `log`.
pub fn begin_extraction(
    archive: Arc<Archive>,
    index: Arc<ArchiveIndex>,
    dest: &Path,
    options: &ExtractOptions,
    log: Arc<dyn LogSink>,
) -> Result<JobHandle, ExtractError> {
    ExtractionJob::new(archive, index, dest, options, log)?.spawn()
}

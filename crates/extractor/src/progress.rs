//! Log and progress state shared between workers and the host.
//!
//! Workers only ever write here; the host polls. Nothing in the core pushes to
//! a renderer.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Receiver for human-readable extraction log lines.
///
/// Called concurrently from every worker.
pub trait LogSink: Send + Sync {
    fn append_log(&self, line: &str);
}

/// Mutex-guarded text buffer; the stock [`LogSink`].
#[derive(Debug, Default)]
pub struct LogBuffer {
    text: Mutex<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything appended since the last drain.
    pub fn drain(&self) -> String {
        std::mem::take(&mut *self.text.lock())
    }

    /// Copy of the current contents without draining.
    pub fn snapshot(&self) -> String {
        self.text.lock().clone()
    }
}

impl LogSink for LogBuffer {
    fn append_log(&self, line: &str) {
        let mut text = self.text.lock();
        text.push_str(line);
        text.push('\n');
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl LogSink for NullLog {
    fn append_log(&self, _line: &str) {}
}

/// Counters for one extraction batch.
#[derive(Debug)]
pub struct Progress {
    completed: AtomicUsize,
    total: usize,
    finished: AtomicBool,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            finished: AtomicBool::new(false),
        }
    }

    /// Count one entry as handled, successful or not.
    pub fn complete_one(&self) -> usize {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.load(Ordering::Acquire),
            total: self.total,
            finished: self.finished.load(Ordering::Acquire),
        }
    }
}

/// What the host sees when it polls a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub finished: bool,
}

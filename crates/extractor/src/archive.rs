//! Read-only archive buffer.

use crate::error::ExtractError;
use std::fs;
use std::path::{Path, PathBuf};

/// The whole archive loaded into memory.
///
/// Never mutated after loading, so workers share it freely behind an `Arc`.
/// Every access to payload bytes goes through [`Archive::slice`].
#[derive(Debug, Clone)]
pub struct Archive {
    data: Box<[u8]>,
    path: Option<PathBuf>,
}

impl Archive {
    /// Load an archive from disk.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path does not exist and `Io` if it cannot be read.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "loaded archive");

        Ok(Self {
            data: data.into_boxed_slice(),
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into().into_boxed_slice(),
            path: None,
        }
    }

    /// Source path, if the archive came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bounds-checked `(start, len)` view into the archive.
    ///
    /// Returns `None` when `start + len` overflows or passes the end of the buffer.
    pub fn slice(&self, start: u64, len: u64) -> Option<&[u8]> {
        let end = start.checked_add(len)?;
        if end > self.data.len() as u64 {
            return None;
        }
        Some(&self.data[start as usize..end as usize])
    }
}

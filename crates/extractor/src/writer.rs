//! Writing decoded entries under the destination root.

use crate::error::EntryError;
use crate::safety::entry_path;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `data` to `dest/<name>`, creating parent directories and replacing
/// any existing file.
///
/// Returns the full path written.
pub fn write_entry(dest: &Path, name: &[u8], data: &[u8]) -> Result<PathBuf, EntryError> {
    let output_path = dest.join(entry_path(name)?);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| EntryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&output_path, data).map_err(|source| EntryError::Write {
        path: output_path.clone(),
        source,
    })?;

    Ok(output_path)
}

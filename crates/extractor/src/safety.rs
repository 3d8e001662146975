//! Entry-name validation.
//!
//! Entry names are stored with forward slashes. They are rebuilt component by
//! component so the result uses host separators and can never climb out of the
//! destination root.

use crate::error::SecurityError;
use std::path::PathBuf;

/// Convert a raw entry name into a relative path under the destination.
///
/// Both `/` and `\` count as separators; empty and `.` components are dropped.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use smf_extractor::safety::entry_path;
///
/// let path = entry_path(b"textures/hero.dds").unwrap();
/// assert_eq!(path, Path::new("textures").join("hero.dds"));
///
/// assert!(entry_path(b"../../etc/passwd").is_err());
/// assert!(entry_path(b"/etc/passwd").is_err());
/// ```
pub fn entry_path(name: &[u8]) -> Result<PathBuf, SecurityError> {
    let name = String::from_utf8_lossy(name);

    if name.starts_with('/') || name.starts_with('\\') || has_drive_prefix(&name) {
        return Err(SecurityError::AbsolutePath(name.into_owned()));
    }

    let mut normalized = PathBuf::new();
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(SecurityError::PathTraversal(format!(
                    "Path contains '..' component: {}",
                    name
                )))
            }
            _ => normalized.push(part),
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(SecurityError::EmptyPath);
    }

    Ok(normalized)
}

/// `C:` style prefixes.
fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

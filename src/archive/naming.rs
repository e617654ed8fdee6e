//! Name rules for archives and their entries
//!
//! Neither the archive name nor a part's filename is trusted. Entry names are
//! reduced to their final path segment so no entry can point outside the
//! archive root; archive names are rejected outright if they could resolve
//! outside the output directory.

use std::path::{Path, PathBuf};

use super::types::ARCHIVE_EXTENSION;
use crate::error::{ArchiveError, Result};

/// Entry name for the part at `position` (0-based).
///
/// Splits on both `/` and `\` because browsers on Windows may send full
/// client paths. Segments that are empty, `.` or `..` fall back to
/// `file-<n>` with a 1-based `n`.
pub fn entry_name(filename: &str, position: usize) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\0'))
        .map(str::to_string)
        .unwrap_or_else(|| format!("file-{}", position + 1))
}

/// Validate the caller-supplied archive name
pub fn validate_archive_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0']);

    if invalid {
        return Err(ArchiveError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// `<output_dir>/<name>.zip` for an already validated name
pub fn archive_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", name, ARCHIVE_EXTENSION))
}

//! Streaming zip pipeline
//!
//! Blocking code: callers on the async runtime go through
//! [`ArchiveService`](super::ArchiveService), which runs it on the blocking
//! pool. Parts are written strictly in order because a zip writer accepts
//! one open entry at a time.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::naming::{archive_path, entry_name};
use super::types::{ArchiveSummary, UploadedPart};
use crate::error::{ArchiveError, Result};

/// Create `output_dir` (and parents) if missing
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder
        .create(output_dir)
        .map_err(|source| ArchiveError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })
}

/// Entry options for a part of `len_hint` bytes.
///
/// Zip64 headers are required once an entry reaches 4GB; a part of unknown
/// size gets them up front since the local header is written before the data.
pub fn entry_options(len_hint: Option<u64>) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .large_file(len_hint.map_or(true, |len| len >= u64::from(u32::MAX)))
}

/// Write `parts` into `<output_dir>/<name>.zip`, replacing any existing file.
///
/// `name` must already be validated. On failure the remaining parts are
/// skipped and the archive is left as far as it got; the writer still emits
/// its central directory when dropped.
pub fn write_archive(output_dir: &Path, name: &str, parts: &[UploadedPart]) -> Result<ArchiveSummary> {
    ensure_output_dir(output_dir)?;

    let path = archive_path(output_dir, name);
    let file = File::create(&path).map_err(|source| ArchiveError::CreateFile {
        path: path.clone(),
        source,
    })?;

    let mut zip = ZipWriter::new(file);

    let mut entries = Vec::with_capacity(parts.len());
    let mut bytes = 0u64;

    for (position, part) in parts.iter().enumerate() {
        let mut reader = part.source.open().map_err(|source| ArchiveError::OpenPart {
            filename: part.filename.clone(),
            source,
        })?;

        let entry = entry_name(&part.filename, position);

        zip.start_file(entry.as_str(), entry_options(part.source.len_hint()))
            .map_err(|source| ArchiveError::Entry {
                entry: entry.clone(),
                source,
            })?;

        // io::copy streams through a fixed-size stack buffer
        let copied = io::copy(&mut reader, &mut zip).map_err(|source| ArchiveError::Copy {
            entry: entry.clone(),
            source,
        })?;
        drop(reader);

        tracing::debug!(entry = %entry, bytes = copied, "Added archive entry");
        bytes += copied;
        entries.push(entry);
    }

    zip.finish().map_err(ArchiveError::Finalize)?;

    Ok(ArchiveSummary {
        path,
        entries,
        bytes,
    })
}

//! Upload and archive types

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

// ============================================================================
// Constants
// ============================================================================

/// In-memory buffering ceiling per request: 8MB
pub const DEFAULT_MAX_MULTIPART_MEMORY: usize = 8 << 20;

/// Form field carrying the archive's base name
pub const NAME_FIELD: &str = "name";

/// Form field carrying the uploaded files
pub const FILES_FIELD: &str = "files";

/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Response body for a fully written archive
pub const SUCCESS_MESSAGE: &str = "All files zipped successfully";

// ============================================================================
// Part Sources
// ============================================================================

/// Readable body of an uploaded part.
///
/// `open` hands out a fresh reader positioned at the start of the content.
/// The reader is dropped as soon as its entry has been written, so an
/// implementation that holds an OS handle releases it there.
pub trait PartSource: Send + Sync {
    fn open(&self) -> std::io::Result<Box<dyn Read + Send + '_>>;

    /// Size in bytes, if known up front
    fn len_hint(&self) -> Option<u64> {
        None
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// One uploaded file
pub struct UploadedPart {
    /// Filename claimed by the client; untrusted
    pub filename: String,

    /// Content of the part
    pub source: Box<dyn PartSource>,
}

impl UploadedPart {
    pub fn new(filename: impl Into<String>, source: impl PartSource + 'static) -> Self {
        Self {
            filename: filename.into(),
            source: Box::new(source),
        }
    }
}

impl fmt::Debug for UploadedPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedPart")
            .field("filename", &self.filename)
            .field("len", &self.source.len_hint())
            .finish()
    }
}

/// A decoded upload: archive name plus the files to bundle, in arrival order
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub name: String,
    pub parts: Vec<UploadedPart>,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: UploadedPart) -> Self {
        self.parts.push(part);
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a fully written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Path of the archive on disk
    pub path: PathBuf,

    /// Entry names in the order they were written
    pub entries: Vec<String>,

    /// Uncompressed bytes copied into the archive
    pub bytes: u64,
}

//! Upload-to-archive pipeline
//!
//! Turns an [`UploadRequest`] into `<output_dir>/<name>.zip`:
//! 1. Reject requests without files or with an unsafe archive name
//! 2. Take the per-name lock
//! 3. Stream every part, in order, into its own Deflate entry
//!
//! A failure stops at the failing part. Whatever was written so far stays on
//! disk; nothing is rolled back.

pub mod locks;
pub mod naming;
pub mod spool;
pub mod types;
pub mod writer;

use std::path::PathBuf;
use std::sync::Arc;

pub use locks::ArchiveLocks;
pub use spool::{MemoryBudget, PartSpooler, SpooledPart};
pub use types::*;

use crate::error::{ArchiveError, Result};

/// Bundles upload requests into archives under one output directory
#[derive(Clone)]
pub struct ArchiveService {
    output_dir: Arc<PathBuf>,
    locks: ArchiveLocks,
}

impl ArchiveService {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Arc::new(output_dir.into()),
            locks: ArchiveLocks::new(),
        }
    }

    /// Validate `request` and write its archive
    pub async fn bundle(&self, request: UploadRequest) -> Result<ArchiveSummary> {
        if request.parts.is_empty() {
            return Err(ArchiveError::NoFiles);
        }
        let name = naming::validate_archive_name(&request.name)?.to_string();

        let guard = self.locks.acquire(&name).await;

        tracing::info!(
            name = %name,
            parts = request.parts.len(),
            "Writing archive"
        );

        let output_dir = self.output_dir.clone();
        // The guard moves into the blocking task: the write keeps running if
        // this future is dropped, and the name stays locked until it ends
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            writer::write_archive(&output_dir, &name, &request.parts)
        })
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?
    }
}

//! Memory-bounded part buffering
//!
//! File parts arrive as a stream of chunks. Each request gets a
//! [`MemoryBudget`]; a part is kept in memory while the request's running
//! total fits the budget and moves to an anonymous temp file from the chunk
//! that would cross it. Temp files are unlinked on creation and disappear
//! when the part is dropped.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};

use axum::body::Bytes;
use tokio::io::AsyncWriteExt;

use super::types::PartSource;
use crate::error::{ArchiveError, Result};

// ============================================================================
// Memory Budget
// ============================================================================

/// Remaining in-memory allowance for one request
#[derive(Debug, Clone, Copy)]
pub struct MemoryBudget {
    remaining: usize,
}

impl MemoryBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reserve `len` bytes; returns false and reserves nothing if they don't fit
    fn try_reserve(&mut self, len: usize) -> bool {
        if len > self.remaining {
            return false;
        }
        self.remaining -= len;
        true
    }

    /// Hand back a reservation that was never used
    fn release(&mut self, len: usize) {
        self.remaining += len;
    }
}

// ============================================================================
// Spooled Part
// ============================================================================

/// A fully received part body, in memory or on disk
#[derive(Debug)]
pub enum SpooledPart {
    Memory(Bytes),
    Disk { file: File, len: u64 },
}

impl SpooledPart {
    /// Body size in bytes
    pub fn size(&self) -> u64 {
        match self {
            Self::Memory(bytes) => bytes.len() as u64,
            Self::Disk { len, .. } => *len,
        }
    }

    pub fn is_on_disk(&self) -> bool {
        matches!(self, Self::Disk { .. })
    }
}

impl PartSource for SpooledPart {
    fn open(&self) -> std::io::Result<Box<dyn Read + Send + '_>> {
        match self {
            Self::Memory(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            Self::Disk { file, .. } => {
                // The clone shares the cursor with `file`; rewind before reading
                let mut handle = file.try_clone()?;
                handle.seek(SeekFrom::Start(0))?;
                Ok(Box::new(handle))
            }
        }
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.size())
    }
}

// ============================================================================
// Spooler
// ============================================================================

/// Accumulates one part's chunks
pub struct PartSpooler<'a> {
    budget: &'a mut MemoryBudget,
    memory: Vec<u8>,
    disk: Option<tokio::fs::File>,
    len: u64,
}

impl<'a> PartSpooler<'a> {
    pub fn new(budget: &'a mut MemoryBudget) -> Self {
        Self {
            budget,
            memory: Vec::new(),
            disk: None,
            len: 0,
        }
    }

    /// Append one chunk of the part body
    pub async fn push(&mut self, chunk: &[u8]) -> Result<()> {
        self.len += chunk.len() as u64;

        if let Some(file) = self.disk.as_mut() {
            return file.write_all(chunk).await.map_err(ArchiveError::Spool);
        }

        if self.budget.try_reserve(chunk.len()) {
            self.memory.extend_from_slice(chunk);
            return Ok(());
        }

        // Crossing the ceiling: move what we hold so far to disk and give its
        // reservation back to the request
        let spill = tempfile::tempfile().map_err(ArchiveError::Spool)?;
        let mut file = tokio::fs::File::from_std(spill);
        file.write_all(&self.memory).await.map_err(ArchiveError::Spool)?;
        file.write_all(chunk).await.map_err(ArchiveError::Spool)?;
        self.budget.release(self.memory.len());
        self.memory = Vec::new();
        self.disk = Some(file);

        tracing::debug!(bytes = self.len, "Spilled upload part to temporary file");
        Ok(())
    }

    /// Finish the part
    pub async fn finish(self) -> Result<SpooledPart> {
        match self.disk {
            Some(mut file) => {
                file.flush().await.map_err(ArchiveError::Spool)?;
                Ok(SpooledPart::Disk {
                    file: file.into_std().await,
                    len: self.len,
                })
            }
            None => Ok(SpooledPart::Memory(Bytes::from(self.memory))),
        }
    }
}

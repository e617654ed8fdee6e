//! Per-name write exclusion
//!
//! Two requests for the same archive name would otherwise truncate and write
//! the same file concurrently. Each name gets its own async mutex; requests
//! for different names never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of per-name locks
#[derive(Clone, Default)]
pub struct ArchiveLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Held for as long as a request writes its archive
pub struct ArchiveGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ArchiveLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request holds `name`, then hold it
    pub async fn acquire(&self, name: &str) -> ArchiveGuard {
        let lock = {
            let mut table = self.inner.lock();
            // Drop entries nobody is holding or waiting on
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            table
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        ArchiveGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of names currently tracked
    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

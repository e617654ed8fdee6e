//! Application state management

use std::sync::Arc;

use crate::archive::ArchiveService;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    archives: ArchiveService,
}

impl AppState {
    /// Create a new application state writing archives to the configured upload directory
    pub fn new(config: Config) -> Self {
        let archives = ArchiveService::new(config.storage.upload_dir.clone());
        Self {
            inner: Arc::new(AppStateInner { config, archives }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the archive service
    pub fn archives(&self) -> &ArchiveService {
        &self.inner.archives
    }
}

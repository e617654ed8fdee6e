//! Error types for the archive upload server

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type for the upload pipeline
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Every way an upload request can fail.
///
/// The first three variants are caller mistakes and map to `400`; the rest
/// are local I/O or archive failures and map to `500`.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    Multipart(String),

    #[error("no files uploaded")]
    NoFiles,

    #[error("invalid archive name {0:?}")]
    InvalidName(String),

    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create archive {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open uploaded file {filename:?}: {source}")]
    OpenPart {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to add entry {entry:?}: {source}")]
    Entry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write entry {entry:?}: {source}")]
    Copy {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to finalize archive: {0}")]
    Finalize(#[source] zip::result::ZipError),

    #[error("failed to buffer upload: {0}")]
    Spool(#[source] std::io::Error),

    #[error("archive task failed: {0}")]
    Task(String),
}

impl ArchiveError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Multipart(_) | Self::NoFiles | Self::InvalidName(_) => StatusCode::BAD_REQUEST,
            Self::CreateDir { .. }
            | Self::CreateFile { .. }
            | Self::OpenPart { .. }
            | Self::Entry { .. }
            | Self::Copy { .. }
            | Self::Finalize(_)
            | Self::Spool(_)
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ArchiveError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Upload failed");
        } else {
            tracing::warn!(error = %self, "Rejected upload request");
        }

        (status, self.to_string()).into_response()
    }
}

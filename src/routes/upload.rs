//! Upload Route
//!
//! `POST /upload` takes `multipart/form-data` with a `name` field and one or
//! more `files` parts, and writes them to `<upload_dir>/<name>.zip`.
//!
//! Responses are plain text: `200` on success, `400` for a malformed or
//! empty request, `500` when the archive could not be written.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};

use crate::archive::{
    MemoryBudget, PartSpooler, UploadRequest, UploadedPart, FILES_FIELD, NAME_FIELD,
    SUCCESS_MESSAGE,
};
use crate::error::{ArchiveError, Result};
use crate::state::AppState;

// ============================================================================
// Handlers
// ============================================================================

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<&'static str> {
    let mut multipart = multipart.map_err(|e| ArchiveError::Multipart(e.body_text()))?;

    let request =
        read_upload_request(&mut multipart, state.config().upload.max_multipart_memory).await?;

    let summary = state.archives().bundle(request).await?;

    tracing::info!(
        path = %summary.path.display(),
        entries = summary.entries.len(),
        bytes = summary.bytes,
        "Archive written"
    );

    Ok(SUCCESS_MESSAGE)
}

// ============================================================================
// Multipart Decoding
// ============================================================================

/// Read the whole form, spooling file parts within `max_memory`.
///
/// Fields may arrive in any order. The first `name` value wins; `files`
/// fields without a filename are plain values and are skipped, as is any
/// other field.
pub async fn read_upload_request(
    multipart: &mut Multipart,
    max_memory: usize,
) -> Result<UploadRequest> {
    let mut budget = MemoryBudget::new(max_memory);
    let mut name: Option<String> = None;
    let mut parts = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        match (field_name.as_str(), filename) {
            (FILES_FIELD, Some(filename)) => {
                let mut spooler = PartSpooler::new(&mut budget);
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    spooler.push(&chunk).await?;
                }
                let body = spooler.finish().await?;

                tracing::debug!(
                    filename = %filename,
                    bytes = body.size(),
                    on_disk = body.is_on_disk(),
                    "Received file part"
                );
                parts.push(UploadedPart::new(filename, body));
            }
            (NAME_FIELD, None) if name.is_none() => {
                name = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => drain(&mut field).await?,
        }
    }

    Ok(UploadRequest {
        name: name.unwrap_or_default(),
        parts,
    })
}

/// Skip a field's body without holding it
async fn drain(field: &mut Field<'_>) -> Result<()> {
    while field.chunk().await.map_err(multipart_error)?.is_some() {}
    Ok(())
}

fn multipart_error(err: MultipartError) -> ArchiveError {
    ArchiveError::Multipart(err.body_text())
}

//! Upload ingestion for `POST /upload`.
//!
//! The uploaded file is staged in a uniquely named temporary file, read back, and removed
//! before the bytes are handed to OCR.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use std::path::Path;
use thiserror::Error;

/// Multipart field carrying the document.
pub const DOCUMENT_FIELD: &str = "document";

/// Errors raised while receiving an upload.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// No `document` field was present in the request.
    #[error("no `document` field in upload")]
    MissingInput,
    /// The multipart stream could not be read: malformed, truncated, or over the body limit.
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    /// Staging the upload on disk failed.
    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Document received from a client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// File name reported by the client, if any.
    pub file_name: Option<String>,
    /// Content type reported by the client, if any. Not validated.
    pub content_type: Option<String>,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

/// Pull the `document` field out of a multipart body.
///
/// Fields with other names are skipped. The first `document` field wins.
pub async fn read_document(multipart: &mut Multipart) -> Result<UploadedDocument, IngestionError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        let bytes = stage_bytes(&data).await?;

        tracing::debug!(
            file_name = ?file_name,
            content_type = ?content_type,
            bytes = bytes.len(),
            "Received upload"
        );

        return Ok(UploadedDocument {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(IngestionError::MissingInput)
}

/// Write `data` to a fresh temporary file, read it back, and delete the file.
pub async fn stage_bytes(data: &[u8]) -> Result<Vec<u8>, IngestionError> {
    stage_in(&std::env::temp_dir(), data).await
}

async fn stage_in(dir: &Path, data: &[u8]) -> Result<Vec<u8>, IngestionError> {
    let temp_file = tempfile::Builder::new()
        .prefix("ocr-upload-")
        .tempfile_in(dir)?;
    let path = temp_file.path().to_path_buf();

    tokio::fs::write(&path, data).await?;
    let bytes = tokio::fs::read(&path).await?;

    if let Err(error) = temp_file.close() {
        tracing::warn!(path = %path.display(), %error, "Failed to remove staged upload");
    }

    Ok(bytes)
}

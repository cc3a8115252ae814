//! File upload handler
//!
//! Returns the uploaded file as base64 so clients can attach it to a message
//! as `image_data`. Nothing is stored.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use nexo_common::{Error, Result};
use serde::Serialize;

use crate::api::middleware::ConversationsState;

/// Name of the multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Response for an accepted upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Base64-encoded file contents
    pub data: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Accept a single file via multipart/form-data
pub async fn upload_file(
    State(state): State<ConversationsState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limit = state.max_upload_bytes;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > limit {
                return Err(Error::PayloadTooLarge(format!(
                    "File exceeds the {} byte upload limit",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(Error::Validation("Uploaded file is empty".to_string()));
        }

        tracing::info!(
            filename = %filename,
            content_type = %content_type,
            size = bytes.len(),
            "Accepted upload"
        );

        return Ok(Json(UploadResponse {
            data: STANDARD.encode(&bytes),
            filename,
            content_type,
        }));
    }

    Err(Error::Validation(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::Validation(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

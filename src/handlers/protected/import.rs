// handlers/protected/import.rs - POST /api/import/csv handler
// Multipart form with a `file` part and a `type` part

use axum::{extract::State, http::StatusCode, Extension};
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::info;

use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::pipeline_service::ImportReport;
use crate::services::PipelineService;
use crate::types::MetricKind;
use crate::AppState;

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File exceeds the upload size limit")
    } else {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/**
 * POST /api/import/csv
 *
 * Rows that fail to parse or validate are reported as `{row, message}` and
 * skipped; the rest are written. Nothing is written when the type, file or
 * header row is invalid.
 *
 * Responds `{"success": true, "imported": n, "errors": [...]}`.
 */
pub async fn import_csv_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> ApiResult<ImportReport> {
    let user = session.require()?.clone();
    let max_bytes = state.config.import.max_file_bytes;

    let mut file: Option<Vec<u8>> = None;
    let mut kind: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > max_bytes {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds the maximum size of {} bytes",
                        max_bytes
                    )));
                }
                file = Some(bytes.to_vec());
            }
            "type" => kind = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let kind: MetricKind = kind
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Missing type. Must be one of: {}",
                MetricKind::allowed_values()
            ))
        })?
        .parse()
        .map_err(ApiError::bad_request)?;

    let file = file.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    if file.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }

    info!("Importing {} CSV ({} bytes) for {}", kind, file.len(), user.id);
    let client = state.clients.authenticated(&session);
    let report = PipelineService::import_csv(&client, user.id, kind, &file).await?;

    Ok(ApiResponse::inline(report))
}

// handlers/public/template.rs - GET /api/import/template?type=

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::PipelineService;
use crate::types::MetricKind;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// CSV template (header plus one example row) served as an attachment
pub async fn template_get(Query(query): Query<TemplateQuery>) -> Result<Response, ApiError> {
    let raw = query
        .kind
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Missing type parameter. Must be one of: {}",
                MetricKind::allowed_values()
            ))
        })?;
    let kind: MetricKind = raw.parse().map_err(ApiError::bad_request)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        PipelineService::template_filename(kind)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        PipelineService::template(kind),
    )
        .into_response())
}

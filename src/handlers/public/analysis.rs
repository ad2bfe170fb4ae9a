// handlers/public/analysis.rs - artist analysis start and progress polling

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{get_user, Session};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ProgressStatus;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub artist_slug: Option<String>,
}

fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 128
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/**
 * POST /api/artist-ai/analyze - Start a background analysis
 *
 * Body: `{"artistSlug": "nova"}`. Signed-in callers own the stored result;
 * anonymous analyses stay unclaimed until the auth callback assigns them.
 *
 * Responds 202 with `{"success": true, "analysisId": "<id>"}`.
 */
pub async fn analyze_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let slug = request
        .artist_slug
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("artistSlug is required"))?;
    if !valid_slug(&slug) {
        return Err(ApiError::bad_request(format!("Invalid artistSlug '{}'", slug)));
    }

    // Results are written with the service client; fail now rather than at the end
    state.clients.service()?;

    let owner = get_user(&session).map(|user| user.id);
    let analysis_id = state.artists.start_analysis(&slug, owner).await;

    Ok(ApiResponse::inline(json!({ "analysisId": analysis_id })).with_status(StatusCode::ACCEPTED))
}

/// GET /api/artist-ai/status/:analysis_id - Unknown or expired ids get the default payload
pub async fn status_get(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
) -> Json<ProgressStatus> {
    Json(state.progress.status(&analysis_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_url_safe() {
        assert!(valid_slug("daft-punk"));
        assert!(valid_slug("artist_42"));
        assert!(!valid_slug("../etc"));
        assert!(!valid_slug("two words"));
        assert!(!valid_slug(""));
    }
}

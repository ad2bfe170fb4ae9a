// handlers/protected/dashboard.rs - GET /api/dashboard/metrics?userId= handler

use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::pipeline_service::DashboardMetrics;
use crate::services::PipelineService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub user_id: Option<String>,
}

/**
 * GET /api/dashboard/metrics?userId=<uuid>
 *
 * All five metric categories for the signed-in user. `userId` must be the
 * caller's own id; anything else is rejected before a query runs.
 */
pub async fn metrics_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<DashboardMetrics> {
    let user = session.require()?;

    let raw = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userId is required"))?;
    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request(format!("Invalid userId '{}'", raw)))?;

    if user_id != user.id {
        warn!("User {} requested metrics for {}", user.id, user_id);
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let client = state.clients.authenticated(&session);
    let metrics = PipelineService::dashboard_metrics(&client, user_id).await?;
    Ok(ApiResponse::success(metrics))
}

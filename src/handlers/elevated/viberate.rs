// handlers/elevated/viberate.rs - GET /api/viberate/debug-sync?userId= handler
// Runs the provider history sync on behalf of any user

use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::ApiError;
use crate::handlers::elevated::require_superadmin;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::pipeline_service::SyncReport;
use crate::services::PipelineService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSyncQuery {
    pub user_id: Option<String>,
}

pub async fn debug_sync_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<DebugSyncQuery>,
) -> ApiResult<SyncReport> {
    let (admin, service) = require_superadmin(&state, &session).await?;

    let raw = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userId is required"))?;
    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request(format!("Invalid userId '{}'", raw)))?;

    info!("Operator {} syncing provider history for {}", admin.id, user_id);
    let report = PipelineService::sync_provider_history(&service, state.provider.as_ref(), user_id).await?;
    Ok(ApiResponse::inline(report))
}

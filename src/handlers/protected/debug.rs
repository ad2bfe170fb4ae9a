// handlers/protected/debug.rs - /api/debug/* diagnostics for the signed-in user

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::pipeline_service::{FanEngagementSummary, SyncReport};
use crate::services::PipelineService;
use crate::types::MetricKind;
use crate::AppState;

/// GET /api/debug/fan-engagement - Engagement rows with counts by level and platform
pub async fn fan_engagement_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<FanEngagementSummary> {
    let user = session.require()?;
    let client = state.clients.authenticated(&session);

    let summary = PipelineService::fan_engagement(&client, user.id).await?;
    Ok(ApiResponse::success(summary))
}

/// POST /api/debug/sync-viberate-history - Pull the caller's provider history
pub async fn sync_history_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<SyncReport> {
    let user = session.require()?;
    let client = state.clients.authenticated(&session);

    let report = PipelineService::sync_provider_history(&client, state.provider.as_ref(), user.id).await?;
    Ok(ApiResponse::inline(report))
}

/**
 * GET /api/debug/test-db - Connectivity diagnostics
 *
 * Reports each check separately so a broken table does not hide the others.
 */
pub async fn test_db_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Value> {
    let user = session.require()?;
    let client = state.clients.authenticated(&session);

    let connection = match client.ping().await {
        Ok(()) => json!({ "ok": true }),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    };

    let profile = match client.profile(user.id).await {
        Ok(Some(profile)) => json!({ "ok": true, "found": true, "globalRole": profile.global_role }),
        Ok(None) => json!({ "ok": true, "found": false }),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    };

    let mut tables = serde_json::Map::new();
    for kind in MetricKind::ALL {
        let check = match client.metrics(user.id, kind).await {
            Ok(rows) => json!({ "ok": true, "rows": rows.len() }),
            Err(e) => json!({ "ok": false, "error": e.to_string() }),
        };
        tables.insert(kind.table_name().to_string(), check);
    }

    Ok(ApiResponse::success(json!({
        "userId": user.id,
        "connection": connection,
        "profile": profile,
        "tables": tables,
        "serviceRole": state.clients.has_service_role(),
        "environment": format!("{:?}", state.config.environment),
    })))
}

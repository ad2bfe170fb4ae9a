// handlers/elevated/setup.rs - GET /api/setup-progress-table handler

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::Session;
use crate::handlers::elevated::require_superadmin;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// Create `analysis_progress` and its index if missing. Safe to repeat.
pub async fn setup_progress_table_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Value> {
    let (user, service) = require_superadmin(&state, &session).await?;

    service.ensure_progress_table().await?;
    info!("analysis_progress table ensured by {}", user.id);

    Ok(ApiResponse::success(json!({
        "table": "analysis_progress",
        "message": "Progress table is ready"
    })))
}

// handlers/public/status.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Artist OS API",
            "version": version,
            "description": "Artist management backend: metrics dashboards, CSV imports, artist analysis",
            "endpoints": {
                "health": "/health (public)",
                "analysis": "/api/artist-ai/analyze, /api/artist-ai/status/:analysisId (public)",
                "template": "/api/import/template?type= (public)",
                "callback": "/auth/callback (public)",
                "dashboard": "/api/dashboard/metrics?userId= (session)",
                "import": "/api/import/csv (session)",
                "debug": "/api/debug/* (session)",
                "operator": "/api/setup-progress-table, /api/viberate/debug-sync (superadmin)",
            }
        }
    }))
}

/// Liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let client = state.clients.server(&Session::anonymous());

    match client.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of an in-flight artist analysis, polled by the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProgress {
    pub id: String,
    pub progress: i32,
    pub message: String,
    pub estimated_time: i64,
    pub complete: bool,
    pub success: Option<bool>,
    pub error: Option<String>,
    pub artist_slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisProgress {
    pub fn started(id: impl Into<String>, artist_slug: Option<String>, estimated_time: i64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            progress: 0,
            message: "Initializing analysis...".to_string(),
            estimated_time,
            complete: false,
            success: None,
            error: None,
            artist_slug,
            created_at: now,
            updated_at: now,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored outcome of an artist analysis. `user_id` stays empty for analyses
/// started before sign-in until the auth callback claims them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtistAnalysis {
    pub id: String,
    pub user_id: Option<Uuid>,
    pub artist_slug: String,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

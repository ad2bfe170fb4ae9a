use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{AnalysisProgress, ArtistAnalysis, MetricRecord, Profile, SocialLink};
use crate::types::MetricKind;

/// Raw data access. Implementations perform no ownership checks; those live
/// in [`crate::database::client::DbClient`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError>;

    /// Artist profile row as a JSON object, legacy columns included
    async fn artist_profile(&self, user_id: Uuid) -> Result<Option<Map<String, Value>>, DatabaseError>;

    async fn social_links(&self, artist_id: Uuid) -> Result<Vec<SocialLink>, DatabaseError>;

    /// Rows of one kind for a user, newest first
    async fn metrics(&self, user_id: Uuid, kind: MetricKind) -> Result<Vec<MetricRecord>, DatabaseError>;

    async fn insert_metric(&self, user_id: Uuid, record: &MetricRecord) -> Result<(), DatabaseError>;

    async fn load_progress(&self, id: &str) -> Result<Option<AnalysisProgress>, DatabaseError>;

    /// Insert or replace by id
    async fn save_progress(&self, record: &AnalysisProgress) -> Result<(), DatabaseError>;

    /// Delete records last updated before `cutoff`, returning how many went
    async fn purge_progress(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError>;

    async fn save_analysis(&self, analysis: &ArtistAnalysis) -> Result<(), DatabaseError>;

    /// Assign an unclaimed analysis to `user_id`. False when no unclaimed
    /// analysis has that id.
    async fn claim_analysis(&self, id: &str, user_id: Uuid) -> Result<bool, DatabaseError>;

    async fn ensure_progress_table(&self) -> Result<(), DatabaseError>;

    async fn apply_schema(&self) -> Result<(), DatabaseError>;
}

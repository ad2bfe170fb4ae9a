use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{AnalysisProgress, ArtistAnalysis, MetricRecord, Profile, SocialLink};
use crate::database::store::Store;
use crate::types::MetricKind;

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    artist_profiles: HashMap<Uuid, Map<String, Value>>,
    social_links: Vec<SocialLink>,
    metrics: Vec<(Uuid, MetricRecord)>,
    progress: HashMap<String, AnalysisProgress>,
    analyses: HashMap<String, ArtistAnalysis>,
}

/// Process-local store for `DATABASE_BACKEND=memory` and tests
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.tables.write().await.profiles.insert(profile.id, profile);
    }

    pub async fn insert_artist_profile(&self, user_id: Uuid, row: Map<String, Value>) {
        self.tables.write().await.artist_profiles.insert(user_id, row);
    }

    pub async fn insert_social_link(&self, link: SocialLink) {
        self.tables.write().await.social_links.push(link);
    }

    pub async fn analysis(&self, id: &str) -> Option<ArtistAnalysis> {
        self.tables.read().await.analyses.get(id).cloned()
    }

    /// Number of metric rows across every user and kind
    pub async fn metric_count(&self) -> usize {
        self.tables.read().await.metrics.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn artist_profile(&self, user_id: Uuid) -> Result<Option<Map<String, Value>>, DatabaseError> {
        Ok(self.tables.read().await.artist_profiles.get(&user_id).cloned())
    }

    async fn social_links(&self, artist_id: Uuid) -> Result<Vec<SocialLink>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut links: Vec<SocialLink> = tables
            .social_links
            .iter()
            .filter(|l| l.artist_id == artist_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| a.platform.cmp(&b.platform));
        Ok(links)
    }

    async fn metrics(&self, user_id: Uuid, kind: MetricKind) -> Result<Vec<MetricRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MetricRecord> = tables
            .metrics
            .iter()
            .filter(|(owner, record)| *owner == user_id && record.kind() == kind)
            .map(|(_, record)| record.clone())
            .collect();
        // Stable sort keeps insertion order within a day
        rows.sort_by(|a, b| b.metric_date().cmp(&a.metric_date()));
        Ok(rows)
    }

    async fn insert_metric(&self, user_id: Uuid, record: &MetricRecord) -> Result<(), DatabaseError> {
        self.tables.write().await.metrics.push((user_id, record.clone()));
        Ok(())
    }

    async fn load_progress(&self, id: &str) -> Result<Option<AnalysisProgress>, DatabaseError> {
        Ok(self.tables.read().await.progress.get(id).cloned())
    }

    async fn save_progress(&self, record: &AnalysisProgress) -> Result<(), DatabaseError> {
        self.tables
            .write()
            .await
            .progress
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn purge_progress(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.progress.len();
        tables.progress.retain(|_, record| record.updated_at >= cutoff);
        Ok((before - tables.progress.len()) as u64)
    }

    async fn save_analysis(&self, analysis: &ArtistAnalysis) -> Result<(), DatabaseError> {
        self.tables
            .write()
            .await
            .analyses
            .insert(analysis.id.clone(), analysis.clone());
        Ok(())
    }

    async fn claim_analysis(&self, id: &str, user_id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.analyses.get_mut(id) {
            Some(analysis) if analysis.user_id.is_none() => {
                analysis.user_id = Some(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ensure_progress_table(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn apply_schema(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::MarketingMetric;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    fn marketing(day: u32, followers: i64) -> MetricRecord {
        MetricRecord::Marketing(MarketingMetric {
            metric_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            platform: "spotify".into(),
            followers,
            impressions: 0,
            engagement_rate: Decimal::ZERO,
        })
    }

    #[tokio::test]
    async fn metrics_are_filtered_by_owner_and_sorted_newest_first() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert_metric(alice, &marketing(1, 10)).await.unwrap();
        store.insert_metric(alice, &marketing(5, 50)).await.unwrap();
        store.insert_metric(bob, &marketing(3, 30)).await.unwrap();

        let rows = store.metrics(alice, MetricKind::Marketing).await.unwrap();
        assert_eq!(rows, vec![marketing(5, 50), marketing(1, 10)]);
        assert!(store.metrics(alice, MetricKind::Agent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyses_can_only_be_claimed_once() {
        let store = MemoryStore::new();
        let analysis = ArtistAnalysis {
            id: "a-1".into(),
            user_id: None,
            artist_slug: "nova".into(),
            result: Value::Null,
            created_at: Utc::now(),
        };
        store.save_analysis(&analysis).await.unwrap();

        let first = Uuid::new_v4();
        assert!(store.claim_analysis("a-1", first).await.unwrap());
        assert!(!store.claim_analysis("a-1", Uuid::new_v4()).await.unwrap());
        assert!(!store.claim_analysis("missing", first).await.unwrap());
        assert_eq!(store.analysis("a-1").await.unwrap().user_id, Some(first));
    }

    #[tokio::test]
    async fn purge_drops_stale_progress() {
        let store = MemoryStore::new();
        let mut stale = AnalysisProgress::started("old", None, 120_000);
        stale.updated_at = Utc::now() - Duration::hours(2);
        store.save_progress(&stale).await.unwrap();
        store
            .save_progress(&AnalysisProgress::started("fresh", None, 120_000))
            .await
            .unwrap();

        let removed = store.purge_progress(Utc::now() - Duration::hours(1)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.load_progress("old").await.unwrap().is_none());
        assert!(store.load_progress("fresh").await.unwrap().is_some());
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::models::ArtistAnalysis;
use crate::database::{ClientFactory, DatabaseError};
use crate::services::progress::ProgressTracker;
use crate::services::viberate::{ArtistDataProvider, ChannelSnapshot, ProviderArtist, ProviderError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Database(#[from] DatabaseError),
}

/// Follower trend of one channel over the fetched history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTrend {
    pub followers: i64,
    pub growth: i64,
    /// Percent change from the first to the latest snapshot, when defined
    pub growth_pct: Option<f64>,
    pub snapshots: usize,
}

/// Runs artist analyses in the background and reports through the tracker
#[derive(Clone)]
pub struct ArtistService {
    clients: ClientFactory,
    provider: Arc<dyn ArtistDataProvider>,
    progress: ProgressTracker,
}

impl ArtistService {
    pub fn new(clients: ClientFactory, provider: Arc<dyn ArtistDataProvider>, progress: ProgressTracker) -> Self {
        Self {
            clients,
            provider,
            progress,
        }
    }

    /// Register a new analysis and run it on a background task. Returns the
    /// analysis id immediately.
    pub async fn start_analysis(&self, artist_slug: &str, owner: Option<Uuid>) -> String {
        let id = Uuid::new_v4().to_string();
        self.progress.start(&id, Some(artist_slug.to_string())).await;
        info!("Started analysis {} for '{}'", id, artist_slug);

        let service = self.clone();
        let task_id = id.clone();
        let slug = artist_slug.to_string();
        tokio::spawn(async move {
            let outcome = service.run(&task_id, &slug, owner).await;
            if let Err(e) = &outcome {
                error!("Analysis {} failed: {}", task_id, e);
            }
            service
                .progress
                .finish(&task_id, outcome.map_err(|e| e.to_string()))
                .await;
        });

        id
    }

    async fn run(&self, id: &str, slug: &str, owner: Option<Uuid>) -> Result<(), AnalysisError> {
        self.progress.update(id, 5, "Looking up artist...", None).await;
        let artist = self.provider.artist_by_slug(slug).await?;

        self.progress
            .update(id, 30, "Fetching fan history...", Some(60_000))
            .await;
        let history = self.provider.fan_history(&artist.uuid).await?;

        self.progress
            .update(id, 70, "Analyzing channels...", Some(15_000))
            .await;
        let result = summarize(&artist, &history);

        self.progress.update(id, 90, "Saving results...", Some(5_000)).await;
        let analysis = ArtistAnalysis {
            id: id.to_string(),
            user_id: owner,
            artist_slug: slug.to_string(),
            result,
            created_at: Utc::now(),
        };
        self.clients.service()?.save_analysis(&analysis).await?;

        Ok(())
    }
}

/// Latest follower count and growth per channel
pub fn channel_trends(history: &[ChannelSnapshot]) -> BTreeMap<String, ChannelTrend> {
    let mut by_channel: BTreeMap<&str, Vec<&ChannelSnapshot>> = BTreeMap::new();
    for snapshot in history {
        by_channel.entry(&snapshot.channel).or_default().push(snapshot);
    }

    by_channel
        .into_iter()
        .filter_map(|(channel, mut snapshots)| {
            snapshots.sort_by_key(|s| s.date);
            let first = snapshots.first()?.followers;
            let latest = snapshots.last()?.followers;
            let growth = latest.saturating_sub(first);
            let growth_pct = (first > 0).then(|| (growth as f64 / first as f64 * 10_000.0).round() / 100.0);

            Some((
                channel.to_string(),
                ChannelTrend {
                    followers: latest,
                    growth,
                    growth_pct,
                    snapshots: snapshots.len(),
                },
            ))
        })
        .collect()
}

fn summarize(artist: &ProviderArtist, history: &[ChannelSnapshot]) -> Value {
    let channels = channel_trends(history);
    let total_followers = channels
        .values()
        .fold(0i64, |total, trend| total.saturating_add(trend.followers));
    let top_channel = channels
        .iter()
        .max_by_key(|(_, trend)| trend.followers)
        .map(|(name, _)| name.clone());

    json!({
        "artist": artist,
        "totalFollowers": total_followers,
        "topChannel": top_channel,
        "channels": channels,
    })
}

//! Viberate artist-data API client
//!
//! Supplies artist lookups by slug and per-channel follower history. The
//! [`ArtistDataProvider`] trait is the seam the services depend on.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;

const USER_AGENT: &str = concat!("artist-os-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Artist data provider access key is not configured")]
    NotConfigured,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderArtist {
    /// Provider's artist UUID, stored as `profiles.viberate_artist_id`
    pub uuid: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Follower count of one channel on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub date: NaiveDate,
    pub channel: String,
    pub followers: i64,
}

#[async_trait]
pub trait ArtistDataProvider: Send + Sync {
    async fn artist_by_slug(&self, slug: &str) -> Result<ProviderArtist, ProviderError>;

    /// Follower history for every channel the provider tracks, oldest first
    async fn fan_history(&self, artist_id: &str) -> Result<Vec<ChannelSnapshot>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HistoryPoint {
    date: NaiveDate,
    value: i64,
}

pub struct ViberateClient {
    http: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
}

impl ViberateClient {
    pub fn new(config: &ProviderConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ProviderError> {
        let key = self.access_key.as_deref().ok_or(ProviderError::NotConfigured)?;
        let url = format!("{}{}", self.base_url, path);
        debug!("Viberate request: {}", url);

        let response = self
            .http
            .get(&url)
            .header("Access-Key", key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(what.to_string())),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Api(status.as_u16(), body))
            }
            _ => response
                .json::<Envelope<T>>()
                .await
                .map(|envelope| envelope.data)
                .map_err(|e| ProviderError::Parse(e.to_string())),
        }
    }
}

#[async_trait]
impl ArtistDataProvider for ViberateClient {
    async fn artist_by_slug(&self, slug: &str) -> Result<ProviderArtist, ProviderError> {
        self.get(
            &format!("/artist/by-slug/{}", slug),
            &format!("artist '{}'", slug),
        )
        .await
    }

    async fn fan_history(&self, artist_id: &str) -> Result<Vec<ChannelSnapshot>, ProviderError> {
        let channels: BTreeMap<String, Vec<HistoryPoint>> = self
            .get(
                &format!("/artist/{}/fanbase/history", artist_id),
                &format!("fan history for artist {}", artist_id),
            )
            .await?;

        Ok(flatten_history(channels))
    }
}

fn flatten_history(channels: BTreeMap<String, Vec<HistoryPoint>>) -> Vec<ChannelSnapshot> {
    let mut snapshots: Vec<ChannelSnapshot> = channels
        .into_iter()
        .flat_map(|(channel, points)| {
            points.into_iter().map(move |point| ChannelSnapshot {
                date: point.date,
                channel: channel.clone(),
                followers: point.value,
            })
        })
        .collect();
    snapshots.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.channel.cmp(&b.channel)));
    snapshots
}

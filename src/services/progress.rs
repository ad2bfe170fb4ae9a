use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::config::ProgressConfig;
use crate::database::models::AnalysisProgress;
use crate::database::ClientFactory;

/// Payload returned to pollers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStatus {
    pub progress: i32,
    pub message: String,
    pub estimated_time: i64,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<AnalysisProgress> for ProgressStatus {
    fn from(record: AnalysisProgress) -> Self {
        Self {
            progress: record.progress,
            message: record.message,
            estimated_time: record.estimated_time,
            complete: record.complete,
            success: record.success,
            error: record.error,
        }
    }
}

/// Progress records of running analyses.
///
/// Records live in a process-local map for fast polling and are written
/// through to `analysis_progress` when service credentials are available, so
/// other instances and restarts can still answer. Records expire `ttl` after
/// their last update.
#[derive(Clone)]
pub struct ProgressTracker {
    records: Arc<RwLock<HashMap<String, AnalysisProgress>>>,
    clients: ClientFactory,
    ttl: Duration,
    default_estimated_time: i64,
}

impl ProgressTracker {
    pub fn new(clients: ClientFactory, config: &ProgressConfig) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            clients,
            ttl: Duration::seconds(config.ttl_secs as i64),
            default_estimated_time: config.default_estimated_time_ms,
        }
    }

    /// What pollers see for ids with no live record
    pub fn default_status(&self) -> ProgressStatus {
        ProgressStatus {
            progress: 0,
            message: "Initializing analysis...".to_string(),
            estimated_time: self.default_estimated_time,
            complete: false,
            success: None,
            error: None,
        }
    }

    pub async fn start(&self, id: &str, artist_slug: Option<String>) -> AnalysisProgress {
        let record = AnalysisProgress::started(id, artist_slug, self.default_estimated_time);
        self.store(record.clone()).await;
        record
    }

    /// Record a step. Progress is clamped to 0..=100 and never moves backwards.
    pub async fn update(&self, id: &str, progress: i32, message: &str, estimated_time: Option<i64>) {
        let Some(mut record) = self.get(id).await else {
            warn!("Progress update for unknown analysis {}", id);
            return;
        };

        record.progress = progress.clamp(0, 100).max(record.progress);
        record.message = message.to_string();
        if let Some(ms) = estimated_time {
            record.estimated_time = ms;
        }
        record.updated_at = Utc::now();
        self.store(record).await;
    }

    /// Mark the analysis finished, successfully when `outcome` is Ok
    pub async fn finish(&self, id: &str, outcome: Result<(), String>) {
        let Some(mut record) = self.get(id).await else {
            warn!("Completion for unknown analysis {}", id);
            return;
        };

        record.complete = true;
        record.estimated_time = 0;
        record.updated_at = Utc::now();
        match outcome {
            Ok(()) => {
                record.progress = 100;
                record.success = Some(true);
                record.message = "Analysis complete".to_string();
            }
            Err(error) => {
                record.success = Some(false);
                record.message = "Analysis failed".to_string();
                record.error = Some(error);
            }
        }
        self.store(record).await;
    }

    /// Live record for `id`: the local map first, then the shared table
    pub async fn get(&self, id: &str) -> Option<AnalysisProgress> {
        let expired = match self.records.read().await.get(id) {
            Some(record) if !self.is_expired(record) => return Some(record.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            let mut records = self.records.write().await;
            if records.get(id).is_some_and(|record| self.is_expired(record)) {
                records.remove(id);
            }
        }

        let client = self.clients.server(&Session::anonymous());
        match client.load_progress(id).await {
            Ok(Some(record)) if !self.is_expired(&record) => {
                self.records
                    .write()
                    .await
                    .insert(record.id.clone(), record.clone());
                Some(record)
            }
            Ok(_) => None,
            Err(e) => {
                debug!("Progress lookup for {} failed: {}", id, e);
                None
            }
        }
    }

    /// Status for pollers, falling back to the default payload
    pub async fn status(&self, id: &str) -> ProgressStatus {
        match self.get(id).await {
            Some(record) => record.into(),
            None => self.default_status(),
        }
    }

    /// Drop expired records locally and in the table. Returns local removals.
    pub async fn purge_expired(&self) -> usize {
        let removed = {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, record| !self.is_expired(record));
            before - records.len()
        };

        if let Ok(client) = self.clients.service() {
            match client.purge_progress(Utc::now() - self.ttl).await {
                Ok(n) if n > 0 => debug!("Purged {} expired progress rows", n),
                Ok(_) => {}
                Err(e) => warn!("Failed to purge progress rows: {}", e),
            }
        }

        removed
    }

    /// Periodically purge expired records until the runtime shuts down
    pub fn spawn_sweeper(&self, every: StdDuration) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = tracker.purge_expired().await;
                if removed > 0 {
                    info!("Expired {} analysis progress records", removed);
                }
            }
        })
    }

    fn is_expired(&self, record: &AnalysisProgress) -> bool {
        Utc::now() - record.updated_at > self.ttl
    }

    async fn store(&self, record: AnalysisProgress) {
        // Progress is advisory; a failed write-through leaves the local copy
        if let Ok(client) = self.clients.service() {
            if let Err(e) = client.save_progress(&record).await {
                warn!("Failed to persist progress for {}: {}", record.id, e);
            }
        }
        self.records.write().await.insert(record.id.clone(), record);
    }
}

//! Metrics pipeline: CSV import, CSV templates, provider history sync and the
//! per-category dashboard summaries.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{
    AgentMetric, ConversionMetric, FanEngagementRecord, MarketingMetric, MetricRecord,
    ProductionMetric,
};
use crate::database::{DatabaseError, DbClient};
use crate::services::viberate::{ArtistDataProvider, ProviderError};
use crate::types::{EngagementLevel, MetricKind};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File is empty")]
    EmptyFile,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("No provider artist is linked to this profile")]
    MissingArtistLink,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A row that was not imported. `row` is the 1-based CSV line, header included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub artist_id: String,
    pub synced: usize,
    pub skipped: usize,
}

/// One dashboard category: headline totals plus the rows behind them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub count: usize,
    pub latest_date: Option<NaiveDate>,
    pub totals: BTreeMap<&'static str, Decimal>,
    pub rows: Vec<MetricRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub production: CategorySummary,
    pub marketing: CategorySummary,
    pub fan_engagement: CategorySummary,
    pub conversion: CategorySummary,
    pub agent: CategorySummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanEngagementSummary {
    pub total: usize,
    pub by_level: BTreeMap<&'static str, usize>,
    pub by_platform: BTreeMap<String, usize>,
    pub records: Vec<FanEngagementRecord>,
}

/// A CSV row shape the importer accepts
trait ImportRow: DeserializeOwned + Into<MetricRecord> {
    const COLUMNS: &'static [&'static str];
    const OPTIONAL: &'static [&'static str] = &[];
    const EXAMPLE: &'static str;

    /// Checks beyond what deserialization enforces
    fn validate(&self) -> Result<(), String>;
}

fn require_text(value: &str, column: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", column))
    } else {
        Ok(())
    }
}

fn require_non_negative<T: PartialOrd + Default>(value: T, column: &str) -> Result<(), String> {
    if value < T::default() {
        Err(format!("{} must not be negative", column))
    } else {
        Ok(())
    }
}

impl ImportRow for ProductionMetric {
    const COLUMNS: &'static [&'static str] = &["date", "project", "stage", "tracks_completed", "hours_spent"];
    const EXAMPLE: &'static str = "2024-01-15,Debut EP,mixing,3,12.5";

    fn validate(&self) -> Result<(), String> {
        require_text(&self.project, "project")?;
        require_text(&self.stage, "stage")?;
        require_non_negative(self.tracks_completed, "tracks_completed")?;
        require_non_negative(self.hours_spent, "hours_spent")
    }
}

impl ImportRow for MarketingMetric {
    const COLUMNS: &'static [&'static str] = &["date", "platform", "followers", "impressions", "engagement_rate"];
    const EXAMPLE: &'static str = "2024-01-15,instagram,12500,48000,3.25";

    fn validate(&self) -> Result<(), String> {
        require_text(&self.platform, "platform")?;
        require_non_negative(self.followers, "followers")?;
        require_non_negative(self.impressions, "impressions")?;
        require_non_negative(self.engagement_rate, "engagement_rate")
    }
}

impl ImportRow for FanEngagementRecord {
    const COLUMNS: &'static [&'static str] = &["date", "fan_name", "email", "platform", "engagement_level"];
    const OPTIONAL: &'static [&'static str] = &["email"];
    const EXAMPLE: &'static str = "2024-01-15,Jordan Lee,jordan@example.com,instagram,active";

    fn validate(&self) -> Result<(), String> {
        require_text(&self.fan_name, "fan_name")?;
        require_text(&self.platform, "platform")
    }
}

impl ImportRow for ConversionMetric {
    const COLUMNS: &'static [&'static str] = &["date", "channel", "visitors", "conversions", "revenue"];
    const EXAMPLE: &'static str = "2024-01-15,merch_store,1200,36,540.00";

    fn validate(&self) -> Result<(), String> {
        require_text(&self.channel, "channel")?;
        require_non_negative(self.visitors, "visitors")?;
        require_non_negative(self.conversions, "conversions")?;
        require_non_negative(self.revenue, "revenue")?;
        if self.conversions > self.visitors {
            return Err("conversions cannot exceed visitors".to_string());
        }
        Ok(())
    }
}

impl ImportRow for AgentMetric {
    const COLUMNS: &'static [&'static str] = &["date", "agent_name", "bookings", "gross_revenue", "commission"];
    const EXAMPLE: &'static str = "2024-01-15,Sam Rivera,2,8000.00,800.00";

    fn validate(&self) -> Result<(), String> {
        require_text(&self.agent_name, "agent_name")?;
        require_non_negative(self.bookings, "bookings")?;
        require_non_negative(self.gross_revenue, "gross_revenue")?;
        require_non_negative(self.commission, "commission")?;
        if self.commission > self.gross_revenue {
            return Err("commission cannot exceed gross_revenue".to_string());
        }
        Ok(())
    }
}

pub struct PipelineService;

impl PipelineService {
    /// Header columns for `kind`, in template order
    pub fn columns(kind: MetricKind) -> &'static [&'static str] {
        match kind {
            MetricKind::Production => ProductionMetric::COLUMNS,
            MetricKind::Marketing => MarketingMetric::COLUMNS,
            MetricKind::FanEngagement => FanEngagementRecord::COLUMNS,
            MetricKind::Conversion => ConversionMetric::COLUMNS,
            MetricKind::Agent => AgentMetric::COLUMNS,
        }
    }

    /// Header row plus one example row
    pub fn template(kind: MetricKind) -> String {
        let example = match kind {
            MetricKind::Production => ProductionMetric::EXAMPLE,
            MetricKind::Marketing => MarketingMetric::EXAMPLE,
            MetricKind::FanEngagement => FanEngagementRecord::EXAMPLE,
            MetricKind::Conversion => ConversionMetric::EXAMPLE,
            MetricKind::Agent => AgentMetric::EXAMPLE,
        };
        format!("{}\n{}\n", Self::columns(kind).join(","), example)
    }

    pub fn template_filename(kind: MetricKind) -> String {
        format!("{}_template.csv", kind)
    }

    /// Import a CSV upload for `user_id`. Bad rows are reported and skipped;
    /// rows already written stay written.
    pub async fn import_csv(
        client: &DbClient,
        user_id: Uuid,
        kind: MetricKind,
        bytes: &[u8],
    ) -> Result<ImportReport, ImportError> {
        let report = match kind {
            MetricKind::Production => import_rows::<ProductionMetric>(client, user_id, bytes).await?,
            MetricKind::Marketing => import_rows::<MarketingMetric>(client, user_id, bytes).await?,
            MetricKind::FanEngagement => import_rows::<FanEngagementRecord>(client, user_id, bytes).await?,
            MetricKind::Conversion => import_rows::<ConversionMetric>(client, user_id, bytes).await?,
            MetricKind::Agent => import_rows::<AgentMetric>(client, user_id, bytes).await?,
        };

        info!(
            "Imported {} {} rows for {} ({} rejected)",
            report.imported,
            kind,
            user_id,
            report.errors.len()
        );
        Ok(report)
    }

    /// Copy the provider's follower history into marketing rows, skipping
    /// (date, platform) pairs that are already stored
    pub async fn sync_provider_history(
        client: &DbClient,
        provider: &dyn ArtistDataProvider,
        user_id: Uuid,
    ) -> Result<SyncReport, ImportError> {
        let artist_id = client
            .profile(user_id)
            .await?
            .and_then(|profile| profile.viberate_artist_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or(ImportError::MissingArtistLink)?;

        let history = provider.fan_history(&artist_id).await?;

        let mut existing: HashSet<(NaiveDate, String)> = client
            .metrics(user_id, MetricKind::Marketing)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                MetricRecord::Marketing(m) => Some((m.metric_date, m.platform)),
                _ => None,
            })
            .collect();

        let mut report = SyncReport {
            artist_id,
            synced: 0,
            skipped: 0,
        };

        for snapshot in history {
            if !existing.insert((snapshot.date, snapshot.channel.clone())) {
                report.skipped += 1;
                continue;
            }

            let record = MetricRecord::Marketing(MarketingMetric {
                metric_date: snapshot.date,
                platform: snapshot.channel,
                followers: snapshot.followers,
                impressions: 0,
                engagement_rate: Decimal::ZERO,
            });
            client.insert_metric(user_id, &record).await?;
            report.synced += 1;
        }

        info!(
            "Synced provider history for {}: {} new, {} skipped",
            user_id, report.synced, report.skipped
        );
        Ok(report)
    }

    /// All five categories, fetched concurrently. The first failure wins.
    pub async fn dashboard_metrics(client: &DbClient, user_id: Uuid) -> Result<DashboardMetrics, DatabaseError> {
        let (production, marketing, fan_engagement, conversion, agent) = tokio::try_join!(
            client.metrics(user_id, MetricKind::Production),
            client.metrics(user_id, MetricKind::Marketing),
            client.metrics(user_id, MetricKind::FanEngagement),
            client.metrics(user_id, MetricKind::Conversion),
            client.metrics(user_id, MetricKind::Agent),
        )?;

        Ok(DashboardMetrics {
            production: summarize(MetricKind::Production, production),
            marketing: summarize(MetricKind::Marketing, marketing),
            fan_engagement: summarize(MetricKind::FanEngagement, fan_engagement),
            conversion: summarize(MetricKind::Conversion, conversion),
            agent: summarize(MetricKind::Agent, agent),
        })
    }

    pub async fn fan_engagement(client: &DbClient, user_id: Uuid) -> Result<FanEngagementSummary, DatabaseError> {
        let records: Vec<FanEngagementRecord> = client
            .metrics(user_id, MetricKind::FanEngagement)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                MetricRecord::FanEngagement(r) => Some(r),
                _ => None,
            })
            .collect();

        let mut by_level: BTreeMap<&'static str, usize> =
            EngagementLevel::ALL.iter().map(|level| (level.as_str(), 0)).collect();
        let mut by_platform: BTreeMap<String, usize> = BTreeMap::new();
        for record in &records {
            *by_level.entry(record.engagement_level.as_str()).or_default() += 1;
            *by_platform.entry(record.platform.clone()).or_default() += 1;
        }

        Ok(FanEngagementSummary {
            total: records.len(),
            by_level,
            by_platform,
            records,
        })
    }
}

async fn import_rows<T: ImportRow>(
    client: &DbClient,
    user_id: Uuid,
    bytes: &[u8],
) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();
    for (row, parsed) in parse_rows::<T>(bytes)? {
        let outcome = match parsed {
            Ok(record) => client
                .insert_metric(user_id, &record.into())
                .await
                .map_err(|e| e.to_string()),
            Err(message) => Err(message),
        };

        match outcome {
            Ok(()) => report.imported += 1,
            Err(message) => {
                warn!("Import row {} rejected: {}", row, message);
                report.errors.push(RowError { row, message });
            }
        }
    }
    Ok(report)
}

/// Parse every data row, pairing each with its line number
fn parse_rows<T: ImportRow>(bytes: &[u8]) -> Result<Vec<(u64, Result<T, String>)>, ImportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ImportError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .clone();

    let present: HashSet<&str> = headers.iter().collect();
    let missing: Vec<String> = T::COLUMNS
        .iter()
        .filter(|column| !T::OPTIONAL.contains(column) && !present.contains(*column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        // Header is line 1
        let fallback = index as u64 + 2;
        let parsed = match result {
            Ok(record) => {
                let row = record.position().map(|p| p.line()).unwrap_or(fallback);
                let value = record
                    .deserialize::<T>(Some(&headers))
                    .map_err(|e| describe_csv_error(&e))
                    .and_then(|value| value.validate().map(|()| value));
                (row, value)
            }
            Err(e) => {
                let row = e.position().map(|p| p.line()).unwrap_or(fallback);
                (row, Err(describe_csv_error(&e)))
            }
        };
        rows.push(parsed);
    }

    Ok(rows)
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("field {}: {}", field + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    }
}

fn summarize(kind: MetricKind, rows: Vec<MetricRecord>) -> CategorySummary {
    let mut totals: BTreeMap<&'static str, Decimal> = BTreeMap::new();
    let mut add = |key: &'static str, value: Decimal| {
        *totals.entry(key).or_insert(Decimal::ZERO) += value;
    };

    // Marketing followers are snapshots; only the newest per platform counts
    let mut latest_followers: HashMap<&str, (NaiveDate, i64)> = HashMap::new();
    let mut engagement_rates = Vec::new();

    if kind == MetricKind::FanEngagement {
        for level in EngagementLevel::ALL {
            add(level.as_str(), Decimal::ZERO);
        }
    }

    for row in &rows {
        match row {
            MetricRecord::Production(m) => {
                add("tracks_completed", Decimal::from(m.tracks_completed));
                add("hours_spent", m.hours_spent);
            }
            MetricRecord::Marketing(m) => {
                add("impressions", Decimal::from(m.impressions));
                engagement_rates.push(m.engagement_rate);
                let entry = latest_followers
                    .entry(m.platform.as_str())
                    .or_insert((m.metric_date, m.followers));
                if m.metric_date > entry.0 {
                    *entry = (m.metric_date, m.followers);
                }
            }
            MetricRecord::FanEngagement(m) => add(m.engagement_level.as_str(), Decimal::ONE),
            MetricRecord::Conversion(m) => {
                add("visitors", Decimal::from(m.visitors));
                add("conversions", Decimal::from(m.conversions));
                add("revenue", m.revenue);
            }
            MetricRecord::Agent(m) => {
                add("bookings", Decimal::from(m.bookings));
                add("gross_revenue", m.gross_revenue);
                add("commission", m.commission);
            }
        }
    }

    match kind {
        MetricKind::Marketing => {
            let followers: Decimal = latest_followers.values().map(|(_, n)| Decimal::from(*n)).sum();
            totals.insert("followers", followers);
            if !engagement_rates.is_empty() {
                let sum: Decimal = engagement_rates.iter().sum();
                let average = sum / Decimal::from(engagement_rates.len());
                totals.insert("engagement_rate", average.round_dp(2));
            }
        }
        MetricKind::Conversion => {
            let visitors = totals.get("visitors").copied().unwrap_or_default();
            let conversions = totals.get("conversions").copied().unwrap_or_default();
            if !visitors.is_zero() {
                let rate = conversions * Decimal::ONE_HUNDRED / visitors;
                totals.insert("conversion_rate", rate.round_dp(2));
            }
        }
        _ => {}
    }

    CategorySummary {
        count: rows.len(),
        latest_date: rows.iter().map(MetricRecord::metric_date).max(),
        totals,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Profile;
    use crate::database::{ClientFactory, MemoryStore};
    use crate::services::viberate::{ChannelSnapshot, ProviderArtist};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn service_client(store: Arc<MemoryStore>) -> DbClient {
        ClientFactory::new(store, true).service().unwrap()
    }

    struct FixedHistory(Vec<ChannelSnapshot>);

    #[async_trait]
    impl ArtistDataProvider for FixedHistory {
        async fn artist_by_slug(&self, slug: &str) -> Result<ProviderArtist, ProviderError> {
            Err(ProviderError::NotFound(slug.to_string()))
        }

        async fn fan_history(&self, _artist_id: &str) -> Result<Vec<ChannelSnapshot>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn templates_parse_cleanly() {
        for kind in MetricKind::ALL {
            let template = PipelineService::template(kind);
            assert_eq!(template.lines().count(), 2);
            assert!(template.starts_with("date,"));

            let rows = match kind {
                MetricKind::Production => parse_rows::<ProductionMetric>(template.as_bytes()).map(|r| r.len()),
                MetricKind::Marketing => parse_rows::<MarketingMetric>(template.as_bytes()).map(|r| r.len()),
                MetricKind::FanEngagement => parse_rows::<FanEngagementRecord>(template.as_bytes()).map(|r| r.len()),
                MetricKind::Conversion => parse_rows::<ConversionMetric>(template.as_bytes()).map(|r| r.len()),
                MetricKind::Agent => parse_rows::<AgentMetric>(template.as_bytes()).map(|r| r.len()),
            };
            assert_eq!(rows.unwrap(), 1, "{} template", kind);
        }
    }

    #[tokio::test]
    async fn imports_valid_rows_and_reports_bad_ones() {
        let store = Arc::new(MemoryStore::new());
        let client = service_client(store.clone());
        let csv = "date,project,stage,tracks_completed,hours_spent\n\
                   2024-01-01,EP,writing,2,10\n\
                   not-a-date,EP,writing,2,10\n\
                   2024-01-03,,mixing,1,4.5\n\
                   2024-01-04,EP,mastering,4,6.25\n";

        let report = PipelineService::import_csv(&client, Uuid::new_v4(), MetricKind::Production, csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        let rows: Vec<u64> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3, 4]);
        assert_eq!(report.errors[1].message, "project is required");
        assert_eq!(store.metric_count().await, 2);
    }

    #[tokio::test]
    async fn rejects_empty_files_and_missing_columns() {
        let client = service_client(Arc::new(MemoryStore::new()));
        let user = Uuid::new_v4();

        let empty = PipelineService::import_csv(&client, user, MetricKind::Agent, b"  \n").await;
        assert!(matches!(empty, Err(ImportError::EmptyFile)));

        let missing = PipelineService::import_csv(&client, user, MetricKind::Agent, b"date,agent_name\n2024-01-01,Sam\n")
            .await
            .unwrap_err();
        match missing {
            ImportError::MissingColumns(columns) => {
                assert_eq!(columns, vec!["bookings", "gross_revenue", "commission"])
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn fan_email_column_is_optional() {
        let client = service_client(Arc::new(MemoryStore::new()));
        let csv = "date,fan_name,platform,engagement_level\n2024-01-01,Ana,tiktok,SUPER\n2024-01-02,Bo,tiktok,lukewarm\n";
        let report = PipelineService::import_csv(&client, Uuid::new_v4(), MetricKind::FanEngagement, csv.as_bytes())
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
    }

    #[tokio::test]
    async fn sync_requires_a_linked_artist() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.insert_profile(Profile::new(user, None)).await;

        let err = PipelineService::sync_provider_history(&service_client(store), &FixedHistory(vec![]), user)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingArtistLink));
    }

    #[tokio::test]
    async fn sync_skips_pairs_already_stored() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let mut profile = Profile::new(user, None);
        profile.viberate_artist_id = Some("vb-1".into());
        store.insert_profile(profile).await;
        let client = service_client(store.clone());

        let snapshot = |day, channel: &str, followers| ChannelSnapshot {
            date: date(day),
            channel: channel.to_string(),
            followers,
        };
        let provider = FixedHistory(vec![
            snapshot(1, "spotify", 100),
            snapshot(2, "spotify", 120),
            snapshot(2, "instagram", 50),
        ]);

        let first = PipelineService::sync_provider_history(&client, &provider, user).await.unwrap();
        assert_eq!((first.synced, first.skipped), (3, 0));

        let second = PipelineService::sync_provider_history(&client, &provider, user).await.unwrap();
        assert_eq!((second.synced, second.skipped), (0, 3));
        assert_eq!(store.metric_count().await, 3);
    }

    #[test]
    fn marketing_followers_use_latest_snapshot_per_platform() {
        let row = |day, platform: &str, followers, rate: i64| {
            MetricRecord::Marketing(MarketingMetric {
                metric_date: date(day),
                platform: platform.to_string(),
                followers,
                impressions: 10,
                engagement_rate: Decimal::from(rate),
            })
        };
        let summary = summarize(
            MetricKind::Marketing,
            vec![row(3, "spotify", 300, 2), row(1, "spotify", 100, 4), row(2, "tiktok", 50, 3)],
        );

        assert_eq!(summary.count, 3);
        assert_eq!(summary.latest_date, Some(date(3)));
        assert_eq!(summary.totals["followers"], Decimal::from(350));
        assert_eq!(summary.totals["impressions"], Decimal::from(30));
        assert_eq!(summary.totals["engagement_rate"], Decimal::from(3));
    }

    #[test]
    fn conversion_rate_is_a_percentage() {
        let summary = summarize(
            MetricKind::Conversion,
            vec![MetricRecord::Conversion(ConversionMetric {
                metric_date: date(1),
                channel: "store".into(),
                visitors: 200,
                conversions: 5,
                revenue: Decimal::from(100),
            })],
        );
        assert_eq!(summary.totals["conversion_rate"], Decimal::new(250, 2));
    }
}

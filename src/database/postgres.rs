use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{Executor, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AgentMetric, AnalysisProgress, ArtistAnalysis, ConversionMetric, FanEngagementRecord,
    MarketingMetric, MetricRecord, ProductionMetric, Profile, SocialLink,
};
use crate::database::store::Store;
use crate::types::MetricKind;

const SCHEMA_SQL: &str = include_str!("../../migrations/001_schema.sql");
const PROGRESS_TABLE_SQL: &str = include_str!("../../migrations/002_analysis_progress.sql");

/// Store backed by the hosted Postgres database
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, email, global_role, onboarding_completed, viberate_artist_id,
             created_at, updated_at
             FROM profiles
             WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn artist_profile(&self, user_id: Uuid) -> Result<Option<Map<String, Value>>, DatabaseError> {
        // row_to_json keeps every legacy column without a fixed struct
        let row = sqlx::query(
            "SELECT row_to_json(t) AS row FROM (
                SELECT * FROM artist_profiles WHERE user_id = $1 ORDER BY created_at LIMIT 1
             ) t",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        match row.try_get::<Value, _>("row")? {
            Value::Object(map) => Ok(Some(map)),
            other => Err(DatabaseError::QueryError(format!(
                "unexpected artist profile format: {}",
                other
            ))),
        }
    }

    async fn social_links(&self, artist_id: Uuid) -> Result<Vec<SocialLink>, DatabaseError> {
        let links = sqlx::query_as::<_, SocialLink>(
            "SELECT artist_id, platform, url FROM social_links WHERE artist_id = $1 ORDER BY platform",
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn metrics(&self, user_id: Uuid, kind: MetricKind) -> Result<Vec<MetricRecord>, DatabaseError> {
        let records = match kind {
            MetricKind::Production => sqlx::query_as::<_, ProductionMetric>(
                "SELECT metric_date, project, stage, tracks_completed, hours_spent
                 FROM production_metrics WHERE user_id = $1 ORDER BY metric_date DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MetricRecord::from)
            .collect(),
            MetricKind::Marketing => sqlx::query_as::<_, MarketingMetric>(
                "SELECT metric_date, platform, followers, impressions, engagement_rate
                 FROM marketing_metrics WHERE user_id = $1 ORDER BY metric_date DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MetricRecord::from)
            .collect(),
            MetricKind::FanEngagement => sqlx::query_as::<_, FanEngagementRecord>(
                "SELECT metric_date, fan_name, email, platform, engagement_level
                 FROM fan_engagement WHERE user_id = $1 ORDER BY metric_date DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MetricRecord::from)
            .collect(),
            MetricKind::Conversion => sqlx::query_as::<_, ConversionMetric>(
                "SELECT metric_date, channel, visitors, conversions, revenue
                 FROM conversion_metrics WHERE user_id = $1 ORDER BY metric_date DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MetricRecord::from)
            .collect(),
            MetricKind::Agent => sqlx::query_as::<_, AgentMetric>(
                "SELECT metric_date, agent_name, bookings, gross_revenue, commission
                 FROM agent_metrics WHERE user_id = $1 ORDER BY metric_date DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(MetricRecord::from)
            .collect(),
        };

        Ok(records)
    }

    async fn insert_metric(&self, user_id: Uuid, record: &MetricRecord) -> Result<(), DatabaseError> {
        let query = match record {
            MetricRecord::Production(m) => sqlx::query(
                "INSERT INTO production_metrics
                 (user_id, metric_date, project, stage, tracks_completed, hours_spent)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id)
            .bind(m.metric_date)
            .bind(&m.project)
            .bind(&m.stage)
            .bind(m.tracks_completed)
            .bind(m.hours_spent),
            MetricRecord::Marketing(m) => sqlx::query(
                "INSERT INTO marketing_metrics
                 (user_id, metric_date, platform, followers, impressions, engagement_rate)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id)
            .bind(m.metric_date)
            .bind(&m.platform)
            .bind(m.followers)
            .bind(m.impressions)
            .bind(m.engagement_rate),
            MetricRecord::FanEngagement(m) => sqlx::query(
                "INSERT INTO fan_engagement
                 (user_id, metric_date, fan_name, email, platform, engagement_level)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id)
            .bind(m.metric_date)
            .bind(&m.fan_name)
            .bind(&m.email)
            .bind(&m.platform)
            .bind(m.engagement_level.as_str()),
            MetricRecord::Conversion(m) => sqlx::query(
                "INSERT INTO conversion_metrics
                 (user_id, metric_date, channel, visitors, conversions, revenue)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id)
            .bind(m.metric_date)
            .bind(&m.channel)
            .bind(m.visitors)
            .bind(m.conversions)
            .bind(m.revenue),
            MetricRecord::Agent(m) => sqlx::query(
                "INSERT INTO agent_metrics
                 (user_id, metric_date, agent_name, bookings, gross_revenue, commission)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id)
            .bind(m.metric_date)
            .bind(&m.agent_name)
            .bind(m.bookings)
            .bind(m.gross_revenue)
            .bind(m.commission),
        };

        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn load_progress(&self, id: &str) -> Result<Option<AnalysisProgress>, DatabaseError> {
        let record = sqlx::query_as::<_, AnalysisProgress>(
            "SELECT id, progress, message, estimated_time, complete, success, error,
             artist_slug, created_at, updated_at
             FROM analysis_progress
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn save_progress(&self, record: &AnalysisProgress) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO analysis_progress
                (id, progress, message, estimated_time, complete, success, error,
                 artist_slug, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                progress = EXCLUDED.progress,
                message = EXCLUDED.message,
                estimated_time = EXCLUDED.estimated_time,
                complete = EXCLUDED.complete,
                success = EXCLUDED.success,
                error = EXCLUDED.error,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(record.progress)
        .bind(&record.message)
        .bind(record.estimated_time)
        .bind(record.complete)
        .bind(record.success)
        .bind(&record.error)
        .bind(&record.artist_slug)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_progress(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM analysis_progress WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn save_analysis(&self, analysis: &ArtistAnalysis) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO artist_analyses (id, user_id, artist_slug, result, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET result = EXCLUDED.result",
        )
        .bind(&analysis.id)
        .bind(analysis.user_id)
        .bind(&analysis.artist_slug)
        .bind(&analysis.result)
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn claim_analysis(&self, id: &str, user_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE artist_analyses SET user_id = $2 WHERE id = $1 AND user_id IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ensure_progress_table(&self) -> Result<(), DatabaseError> {
        // Unparameterised multi-statement SQL goes over the simple query protocol
        self.pool.execute(PROGRESS_TABLE_SQL).await?;
        Ok(())
    }

    async fn apply_schema(&self) -> Result<(), DatabaseError> {
        self.pool.execute(SCHEMA_SQL).await?;
        self.pool.execute(PROGRESS_TABLE_SQL).await?;
        Ok(())
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{EngagementLevel, MetricKind};

// Field names double as CSV header names; `metric_date` is `date` on the wire.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductionMetric {
    #[serde(rename = "date")]
    pub metric_date: NaiveDate,
    pub project: String,
    pub stage: String,
    pub tracks_completed: i32,
    pub hours_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MarketingMetric {
    #[serde(rename = "date")]
    pub metric_date: NaiveDate,
    pub platform: String,
    pub followers: i64,
    pub impressions: i64,
    pub engagement_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FanEngagementRecord {
    #[serde(rename = "date")]
    pub metric_date: NaiveDate,
    pub fan_name: String,
    pub email: Option<String>,
    pub platform: String,
    #[sqlx(try_from = "String")]
    pub engagement_level: EngagementLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ConversionMetric {
    #[serde(rename = "date")]
    pub metric_date: NaiveDate,
    pub channel: String,
    pub visitors: i64,
    pub conversions: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AgentMetric {
    #[serde(rename = "date")]
    pub metric_date: NaiveDate,
    pub agent_name: String,
    pub bookings: i32,
    pub gross_revenue: Decimal,
    pub commission: Decimal,
}

/// A metric row of any kind. Serializes as the bare row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricRecord {
    Production(ProductionMetric),
    Marketing(MarketingMetric),
    FanEngagement(FanEngagementRecord),
    Conversion(ConversionMetric),
    Agent(AgentMetric),
}

impl MetricRecord {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricRecord::Production(_) => MetricKind::Production,
            MetricRecord::Marketing(_) => MetricKind::Marketing,
            MetricRecord::FanEngagement(_) => MetricKind::FanEngagement,
            MetricRecord::Conversion(_) => MetricKind::Conversion,
            MetricRecord::Agent(_) => MetricKind::Agent,
        }
    }

    pub fn metric_date(&self) -> NaiveDate {
        match self {
            MetricRecord::Production(m) => m.metric_date,
            MetricRecord::Marketing(m) => m.metric_date,
            MetricRecord::FanEngagement(m) => m.metric_date,
            MetricRecord::Conversion(m) => m.metric_date,
            MetricRecord::Agent(m) => m.metric_date,
        }
    }
}

impl From<ProductionMetric> for MetricRecord {
    fn from(m: ProductionMetric) -> Self {
        MetricRecord::Production(m)
    }
}

impl From<MarketingMetric> for MetricRecord {
    fn from(m: MarketingMetric) -> Self {
        MetricRecord::Marketing(m)
    }
}

impl From<FanEngagementRecord> for MetricRecord {
    fn from(m: FanEngagementRecord) -> Self {
        MetricRecord::FanEngagement(m)
    }
}

impl From<ConversionMetric> for MetricRecord {
    fn from(m: ConversionMetric) -> Self {
        MetricRecord::Conversion(m)
    }
}

impl From<AgentMetric> for MetricRecord {
    fn from(m: AgentMetric) -> Self {
        MetricRecord::Agent(m)
    }
}

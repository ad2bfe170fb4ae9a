/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric categories shown on the dashboard and accepted by the CSV importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Production,
    Marketing,
    FanEngagement,
    Conversion,
    Agent,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Production,
        MetricKind::Marketing,
        MetricKind::FanEngagement,
        MetricKind::Conversion,
        MetricKind::Agent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Production => "production",
            MetricKind::Marketing => "marketing",
            MetricKind::FanEngagement => "fan_engagement",
            MetricKind::Conversion => "conversion",
            MetricKind::Agent => "agent",
        }
    }

    /// Backing table for rows of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            MetricKind::Production => "production_metrics",
            MetricKind::Marketing => "marketing_metrics",
            MetricKind::FanEngagement => "fan_engagement",
            MetricKind::Conversion => "conversion_metrics",
            MetricKind::Agent => "agent_metrics",
        }
    }

    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "production" => Ok(MetricKind::Production),
            "marketing" => Ok(MetricKind::Marketing),
            "fan_engagement" => Ok(MetricKind::FanEngagement),
            "conversion" => Ok(MetricKind::Conversion),
            "agent" => Ok(MetricKind::Agent),
            other => Err(format!(
                "Invalid import type '{}'. Must be one of: {}",
                other,
                Self::allowed_values()
            )),
        }
    }
}

/// How engaged a fan is, used for grouping on the fan dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    Captured,
    Active,
    Super,
    Unknown,
}

impl EngagementLevel {
    pub const ALL: [EngagementLevel; 4] = [
        EngagementLevel::Captured,
        EngagementLevel::Active,
        EngagementLevel::Super,
        EngagementLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLevel::Captured => "captured",
            EngagementLevel::Active => "active",
            EngagementLevel::Super => "super",
            EngagementLevel::Unknown => "unknown",
        }
    }
}

impl FromStr for EngagementLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "captured" => Ok(EngagementLevel::Captured),
            "active" => Ok(EngagementLevel::Active),
            "super" => Ok(EngagementLevel::Super),
            // Blank cells are common in spreadsheet exports
            "unknown" | "" => Ok(EngagementLevel::Unknown),
            other => Err(format!("invalid engagement_level '{}'", other)),
        }
    }
}

impl TryFrom<String> for EngagementLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'de> Deserialize<'de> for EngagementLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

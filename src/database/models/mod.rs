pub mod analysis;
pub mod artist;
pub mod metrics;
pub mod profile;
pub mod progress;

pub use analysis::ArtistAnalysis;
pub use artist::{ArtistView, SocialLink};
pub use metrics::{
    AgentMetric, ConversionMetric, FanEngagementRecord, MarketingMetric, MetricRecord,
    ProductionMetric,
};
pub use profile::Profile;
pub use progress::AnalysisProgress;

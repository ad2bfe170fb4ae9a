pub mod artist_service;
pub mod pipeline_service;
pub mod progress;
pub mod viberate;

pub use artist_service::ArtistService;
pub use pipeline_service::PipelineService;
pub use progress::{ProgressStatus, ProgressTracker};
pub use viberate::{ArtistDataProvider, ViberateClient};

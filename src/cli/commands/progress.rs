use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{operator_client, OutputFormat};
use crate::config;

#[derive(Subcommand)]
pub enum ProgressCommands {
    #[command(about = "Delete progress rows older than the TTL")]
    Purge {
        #[arg(long, help = "Override PROGRESS_TTL_SECS")]
        ttl_secs: Option<u64>,
    },
}

pub async fn handle(cmd: ProgressCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProgressCommands::Purge { ttl_secs } => {
            let config = config::config();
            let ttl = ttl_secs.unwrap_or(config.progress.ttl_secs);
            let cutoff = Utc::now() - Duration::seconds(ttl as i64);

            let client = operator_client(config).await?;
            let removed = client.purge_progress(cutoff).await?;

            output_success(
                &output_format,
                &format!("Purged {} progress records", removed),
                Some(json!({ "removed": removed, "cutoff": cutoff })),
            )
        }
    }
}

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{operator_client, OutputFormat};
use crate::config;

#[derive(Subcommand)]
pub enum SetupCommands {
    #[command(about = "Apply the full schema (profiles, metrics, progress, analyses)")]
    Schema,

    #[command(about = "Create the analysis_progress table if missing")]
    ProgressTable,
}

pub async fn handle(cmd: SetupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = operator_client(config::config()).await?;

    match cmd {
        SetupCommands::Schema => {
            client.apply_schema().await?;
            output_success(&output_format, "Schema applied", None)
        }
        SetupCommands::ProgressTable => {
            client.ensure_progress_table().await?;
            output_success(
                &output_format,
                "Progress table is ready",
                Some(json!({ "table": "analysis_progress" })),
            )
        }
    }
}

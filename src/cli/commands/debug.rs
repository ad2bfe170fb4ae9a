use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::{operator_client, OutputFormat};
use crate::config;

#[derive(Subcommand)]
pub enum DebugCommands {
    #[command(about = "Check database connectivity")]
    TestDb,
}

pub async fn handle(cmd: DebugCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DebugCommands::TestDb => {
            let config = config::config();
            let client = operator_client(config).await?;

            match client.ping().await {
                Ok(()) => output_success(
                    &output_format,
                    "Database connection ok",
                    Some(json!({
                        "backend": format!("{:?}", config.database.backend),
                        "service_role": config.has_service_role(),
                    })),
                ),
                Err(e) => {
                    output_error(&output_format, &e.to_string(), Some("DATABASE_UNAVAILABLE"))?;
                    Err(e.into())
                }
            }
        }
    }
}

pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::{self, ClientFactory, DbClient};

#[derive(Parser)]
#[command(name = "artist-os")]
#[command(about = "Artist OS operator CLI - schema setup, diagnostics and CSV templates")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create database tables")]
    Setup {
        #[command(subcommand)]
        cmd: commands::setup::SetupCommands,
    },

    #[command(about = "Connectivity diagnostics")]
    Debug {
        #[command(subcommand)]
        cmd: commands::debug::DebugCommands,
    },

    #[command(about = "Analysis progress maintenance")]
    Progress {
        #[command(subcommand)]
        cmd: commands::progress::ProgressCommands,
    },

    #[command(about = "Write a CSV import template")]
    Template(commands::template::TemplateArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Service-scoped client for operator commands. Fails unless a service
/// credential is configured.
pub async fn operator_client(config: &AppConfig) -> anyhow::Result<DbClient> {
    let store = database::open_store(&config.database).await?;
    let clients = ClientFactory::new(store, config.has_service_role());
    Ok(clients.service()?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Setup { cmd } => commands::setup::handle(cmd, output_format).await,
        Commands::Debug { cmd } => commands::debug::handle(cmd, output_format).await,
        Commands::Progress { cmd } => commands::progress::handle(cmd, output_format).await,
        Commands::Template(args) => commands::template::handle(args, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["artist-os", "--json", "setup", "progress-table"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Setup {
                cmd: commands::setup::SetupCommands::ProgressTable
            }
        ));

        let cli = Cli::try_parse_from(["artist-os", "template", "marketing", "--out", "m.csv"]).unwrap();
        match cli.command {
            Commands::Template(args) => {
                assert_eq!(args.kind, crate::types::MetricKind::Marketing);
                assert_eq!(args.out.as_deref(), Some(std::path::Path::new("m.csv")));
            }
            _ => panic!("expected template command"),
        }
    }

    fn memory_config(service_role_key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::development();
        config.database.backend = crate::config::DatabaseBackend::Memory;
        config.auth.service_role_key = service_role_key.map(str::to_string);
        config
    }

    #[tokio::test]
    async fn operator_client_needs_a_service_credential() {
        assert!(operator_client(&memory_config(None)).await.is_err());

        let client = operator_client(&memory_config(Some("service-key"))).await.unwrap();
        assert_eq!(client.scope(), crate::database::Scope::Service);
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::services::PipelineService;
use crate::types::MetricKind;

#[derive(Args)]
pub struct TemplateArgs {
    #[arg(help = "Import type: production, marketing, fan_engagement, conversion, agent")]
    pub kind: MetricKind,

    #[arg(long, help = "Write to this file instead of stdout")]
    pub out: Option<PathBuf>,
}

pub async fn handle(args: TemplateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let template = PipelineService::template(args.kind);

    match args.out {
        Some(path) => {
            tokio::fs::write(&path, &template)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            output_success(
                &output_format,
                &format!("Wrote {} template", args.kind),
                Some(json!({ "path": path.display().to_string() })),
            )
        }
        None => {
            print!("{}", template);
            Ok(())
        }
    }
}

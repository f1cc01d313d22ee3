//! Template command - derive the feature template from a dataset

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::FeatureTemplate;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{parse_csv, write_atomic};

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Source CSV
    #[arg(long)]
    pub data: PathBuf,

    /// Where to write the template JSON
    #[arg(long, default_value = "models/feature_template.json")]
    pub output: PathBuf,
}

pub async fn run(args: TemplateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let template = derive_template(&args).await?;

    info!(
        output = %args.output.display(),
        features = template.len(),
        "Feature template written"
    );
    println!("{}", summary(&args, &template));

    Ok(())
}

fn summary(args: &TemplateArgs, template: &FeatureTemplate) -> String {
    format!(
        "Wrote {} feature defaults to {}",
        template.len(),
        args.output.display()
    )
}

async fn derive_template(args: &TemplateArgs) -> anyhow::Result<FeatureTemplate> {
    let bytes = tokio::fs::read(&args.data)
        .await
        .with_context(|| format!("Cannot read {}", args.data.display()))?;
    let template = FeatureTemplate::from_dataset(&parse_csv(&bytes)?);

    write_atomic(&args.output, template.to_json_pretty()?.as_bytes()).await?;

    Ok(template)
}

//! Train command - offline retraining through the same pipeline as `POST /train`

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::parse_csv;

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// CSV to train on instead of the canonical dataset
    #[arg(long)]
    pub data: Option<PathBuf>,
}

pub async fn run(args: TrainArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let registry = crate::create_model_registry(&config);
    let datasets = crate::create_dataset_service(&config);
    let training = crate::create_training_service(&config, registry, datasets)?;

    let report = match args.data {
        Some(path) => {
            info!(path = %path.display(), "Training from file");
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Cannot read {}", path.display()))?;
            training.train_dataset(parse_csv(&bytes)?).await?
        }
        None => training.train().await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

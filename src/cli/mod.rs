//! CLI module for the Student Success API
//!
//! - `serve`: HTTP service
//! - `train`: offline retraining from a CSV
//! - `template`: derive the feature template from a dataset

pub mod serve;
pub mod template;
pub mod train;

use clap::{Parser, Subcommand};

/// Student Success API - scenario-aware pass/fail prediction
#[derive(Parser)]
#[command(name = "student-success-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,

    /// Retrain every scenario model and print the report as JSON
    Train(train::TrainArgs),

    /// Write a feature template derived from a dataset
    Template(template::TemplateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_train_with_data() {
        let cli = Cli::try_parse_from(["student-success-api", "train", "--data", "d.csv"]).unwrap();

        match cli.command {
            Command::Train(args) => assert_eq!(args.data, Some(PathBuf::from("d.csv"))),
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_template_requires_data() {
        assert!(Cli::try_parse_from(["student-success-api", "template"]).is_err());
    }
}

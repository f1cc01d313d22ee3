use clap::Parser;
use student_success_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Train(args) => cli::train::run(args).await,
        Command::Template(args) => cli::template::run(args).await,
    }
}

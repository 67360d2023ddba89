//! Courtroom CLI entry point.

use anyhow::Result;
use clap::Parser;

use courtroom::cli::{commands, Cli, Commands};
use courtroom::infrastructure::{ConfigLoader, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json).await {
        courtroom::cli::handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Run(args) => commands::run::execute(args, &config, json).await,
        Commands::Simulate(args) => commands::simulate::execute(args, &config, json).await,
        Commands::Check(args) => commands::check::execute(args, json).await,
    }
}

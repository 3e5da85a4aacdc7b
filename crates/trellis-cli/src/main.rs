use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

use trellis_cli::{
    cli::{Cli, Commands},
    commands, logging,
};
use trellis_config::TrellisConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = TrellisConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging, cli.level_override())?;
    debug!(config = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Serve(args) => {
            commands::serve::execute(config, args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Render(args) => commands::render::execute(&config, args).await,
        Commands::Check(args) => commands::check::execute(&config, args),
    }
}

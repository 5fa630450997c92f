mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{CacheCommands, Cli, Commands, SeedCommands};
use coinpress_server::config::loader::load_config;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // .env first, then the config file, matching the server's startup order
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;

    match &cli.command {
        Commands::Seed(args) => match &args.command {
            SeedCommands::Demo => commands::seed::demo(&config).await?,
            SeedCommands::Holders(holders) => commands::seed::holders(&config, holders).await?,
            SeedCommands::Comments(comments) => commands::seed::comments(&config, comments).await?,
        },
        Commands::Cache(args) => match &args.command {
            CacheCommands::Flush => commands::cache::flush(&config).await?,
        },
    }

    Ok(())
}

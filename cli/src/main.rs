//! Operator CLI for the assistant orchestrator.

use clap::Parser;
use std::process;
use tracing::{error, info, Level};

mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;

use cli::{Cli, Commands};
use config::AssistantCtlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = match AssistantCtlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    let config = config.with_overrides(&args);

    let result = match args.command {
        Commands::Query { campaign_uuid, query } => {
            commands::query::handle_query_command(campaign_uuid, query, &config).await
        }
        Commands::Health => commands::health::handle_health_command(&config).await,
        Commands::Cache { command } => commands::cache::handle_cache_command(command, &config).await,
    };

    match result {
        Ok(()) => {
            info!("command completed successfully");
        }
        Err(e) => {
            error!("command failed: {}", e);
            process::exit(1);
        }
    }
}

//! `assistantctl cache` implementation.

use crate::cli::CacheCommands;
use crate::client::AssistantCtlClient;
use crate::config::AssistantCtlConfig;
use crate::error::CliError;
use colored::*;
use tracing::info;

pub async fn handle_cache_command(command: CacheCommands, config: &AssistantCtlConfig) -> Result<(), CliError> {
    match command {
        CacheCommands::Clear { campaign_uuid } => {
            info!("clearing cached query results for campaign {}", campaign_uuid);
            let client = AssistantCtlClient::new(config.clone())?;
            client.cache_clear(campaign_uuid).await?;
            println!("{}", format!("Cleared cache for campaign {campaign_uuid}").green());
            Ok(())
        }
    }
}

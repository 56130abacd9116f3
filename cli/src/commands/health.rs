//! `assistantctl health` implementation.

use crate::client::AssistantCtlClient;
use crate::config::AssistantCtlConfig;
use crate::error::CliError;
use colored::*;
use tracing::info;

pub async fn handle_health_command(config: &AssistantCtlConfig) -> Result<(), CliError> {
    let client = AssistantCtlClient::new(config.clone())?;

    info!("checking orchestrator health at {}", config.endpoint);

    match client.health().await {
        Ok(health) => {
            println!("{}", "✓ orchestrator is healthy".green().bold());
            println!("Status:    {}", health.status.green());
            println!("Version:   {}", health.version);
            println!("Timestamp: {}", health.timestamp);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ orchestrator health check failed".red().bold());
            println!("Error: {}", e.to_string().red());
            Err(e)
        }
    }
}

//! `assistantctl query` implementation.

use crate::cli::OutputFormat;
use crate::client::AssistantCtlClient;
use crate::config::AssistantCtlConfig;
use crate::error::CliError;
use crate::output;
use tracing::info;
use uuid::Uuid;

pub async fn handle_query_command(
    campaign_uuid: Uuid,
    query: String,
    config: &AssistantCtlConfig,
) -> Result<(), CliError> {
    info!("querying campaign {} at {}", campaign_uuid, config.endpoint);

    let client = AssistantCtlClient::new(config.clone())?;
    let response = client.query(campaign_uuid, &query).await?;

    let format: OutputFormat = config.default_format.into();
    output::display_query_result(&response, &format)
}

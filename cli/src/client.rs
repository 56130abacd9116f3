//! HTTP client for the orchestrator server.

use crate::config::AssistantCtlConfig;
use crate::error::CliError;
use orchestrator_core::types::AssistantResponse;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub struct AssistantCtlClient {
    client: Client,
    config: AssistantCtlConfig,
}

impl AssistantCtlClient {
    pub fn new(config: AssistantCtlConfig) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .default_headers(config.auth_headers())
            .build()
            .map_err(|e| CliError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    pub async fn health(&self) -> Result<HealthResponse, CliError> {
        let response = self.get("/health").await?;
        self.handle_response(response).await
    }

    pub async fn query(&self, campaign_uuid: Uuid, query: &str) -> Result<AssistantResponse, CliError> {
        let response = self
            .post(
                &format!("/api/campaigns/{campaign_uuid}/assistant/query"),
                &QueryRequestBody { query: query.to_string() },
            )
            .await?;
        self.handle_response(response).await
    }

    pub async fn cache_clear(&self, campaign_uuid: Uuid) -> Result<(), CliError> {
        let url = self.config.api_url(&format!("/api/campaigns/{campaign_uuid}/cache"));
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| CliError::Request(format!("DELETE /api/campaigns/{campaign_uuid}/cache failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CliError::Server { status: status.as_u16(), body })
        }
    }

    async fn get(&self, path: &str) -> Result<Response, CliError> {
        let url = self.config.api_url(path);
        debug!("GET {}", url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| CliError::Request(format!("GET {path} failed: {e}")))
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, CliError> {
        let url = self.config.api_url(path);
        debug!("POST {}", url);
        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CliError::Request(format!("POST {path} failed: {e}")))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(&self, response: Response) -> Result<T, CliError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| CliError::Request(format!("failed to parse response body: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CliError::Server { status: status.as_u16(), body })
        }
    }
}

#[derive(Serialize)]
struct QueryRequestBody {
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_succeeds_with_default_config() {
        let client = AssistantCtlClient::new(AssistantCtlConfig::default());
        assert!(client.is_ok());
    }
}

//! Configuration management for assistantctl.

use crate::cli::{Cli, OutputFormat};
use crate::error::CliError;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantCtlConfig {
    /// Orchestrator server endpoint.
    pub endpoint: String,
    /// Default output format.
    pub default_format: OutputFormatConfig,
    /// Bearer token, if the deployment requires one.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// A `serde`-friendly mirror of [`OutputFormat`] (clap's `ValueEnum` derive
/// doesn't itself implement `Deserialize`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Table,
    Json,
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(value: OutputFormatConfig) -> Self {
        match value {
            OutputFormatConfig::Table => OutputFormat::Table,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Table => OutputFormatConfig::Table,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl Default for AssistantCtlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            default_format: OutputFormatConfig::Table,
            auth_token: None,
            timeout: 30,
        }
    }
}

impl AssistantCtlConfig {
    pub fn load(config_path: &Option<std::path::PathBuf>) -> Result<Self, CliError> {
        let mut figment = Figment::new()
            .merge(figment::providers::Serialized::defaults(AssistantCtlConfig::default()));

        for path in ["assistantctl.yaml", "assistantctl.yml", ".assistantctl.yaml", ".assistantctl.yml"] {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(CliError::Configuration(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed("ASSISTANTCTL_"));

        figment
            .extract()
            .map_err(|e| CliError::Configuration(format!("failed to parse configuration: {e}")))
    }

    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(ref endpoint) = args.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(format) = args.format.clone() {
            self.default_format = format.into();
        }
        self
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    pub fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(ref token) = self.auth_token {
            if let Ok(value) = format!("Bearer {token}").parse() {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_localhost() {
        let config = AssistantCtlConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn api_url_joins_endpoint_and_path() {
        let config = AssistantCtlConfig::default();
        assert_eq!(config.api_url("/health"), "http://localhost:8080/health");
    }
}

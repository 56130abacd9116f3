//! Deployment configuration: the orchestrator's own budget/model settings
//! plus the connection details for every concrete collaborator it is wired
//! to at startup. Layered the same way as `OrchestratorConfig` itself —
//! `figment` merging an optional YAML file with environment variables.

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use orchestrator_adapter_neo4j::Neo4jConfig;
use orchestrator_adapter_postgres::PostgresConfig;
use orchestrator_adapter_qdrant::{EmbeddingConfig, QdrantConfig};
use orchestrator_connector_anthropic::AnthropicConfig;
use orchestrator_connector_prompt_registry::PromptRegistryConfig;
use orchestrator_core::config::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
    #[serde(flatten)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub prompt_registry: PromptRegistryConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

fn default_bind_address() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("default bind address is valid")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            orchestrator: OrchestratorConfig::default(),
            neo4j: Neo4jConfig::default(),
            qdrant: QdrantConfig::default(),
            embedding: EmbeddingConfig::default(),
            postgres: PostgresConfig::default(),
            prompt_registry: PromptRegistryConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Option<std::path::PathBuf>) -> Result<Self, figment::Error> {
        let mut figment =
            Figment::new().merge(figment::providers::Serialized::defaults(ServerConfig::default()));

        for candidate in ["orchestrator-server.yaml", "orchestrator-server.yml"] {
            if Path::new(candidate).exists() {
                figment = figment.merge(Yaml::file(candidate));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed("ORCHESTRATOR_").split("__"));

        figment.extract()
    }
}

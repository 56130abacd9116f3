//! Process-wide configuration, loaded once at startup — not per request.
//!
//! Layered the way the operator CLI in this workspace loads its own
//! configuration: a YAML file merged with environment variables via
//! `figment`, env vars taking precedence.

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::OrchestratorError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-request budget in seconds.
    #[serde(default = "default_overall_timeout")]
    pub overall_timeout_secs: u64,
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_graph_timeout")]
    pub graph_timeout_secs: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,
    pub planning_model: String,
    pub cypher_model: String,
    pub synthesis_model: String,
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
    #[serde(default = "default_vector_k_default")]
    pub vector_k_default: u8,
    #[serde(default = "default_vector_k_max")]
    pub vector_k_max: u8,
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default = "default_release")]
    pub release: String,
    /// Procedures a deployment has vetted as read-only for `CALL`. Empty by
    /// default.
    #[serde(default)]
    pub cypher_call_allowlist: Vec<String>,
}

fn default_overall_timeout() -> u64 {
    60
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_graph_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    300
}
fn default_embed_dim() -> usize {
    1536
}
fn default_max_query_length() -> usize {
    500
}
fn default_vector_k_default() -> u8 {
    5
}
fn default_vector_k_max() -> u8 {
    50
}
fn default_env() -> String {
    "development".to_string()
}
fn default_release() -> String {
    "0.0.0".to_string()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            overall_timeout_secs: default_overall_timeout(),
            llm_timeout_secs: default_llm_timeout(),
            graph_timeout_secs: default_graph_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            embed_dim: default_embed_dim(),
            planning_model: "claude-3-5-sonnet-20241022".to_string(),
            cypher_model: "claude-3-5-haiku-20241022".to_string(),
            synthesis_model: "claude-3-5-sonnet-20241022".to_string(),
            max_query_length: default_max_query_length(),
            vector_k_default: default_vector_k_default(),
            vector_k_max: default_vector_k_max(),
            env: default_env(),
            release: default_release(),
            cypher_call_allowlist: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from an optional YAML file plus `ORCHESTRATOR_`
    /// prefixed environment variables, env taking precedence.
    pub fn load(config_path: &Option<std::path::PathBuf>) -> Result<Self, OrchestratorError> {
        let mut figment = Figment::new().merge(figment::providers::Serialized::defaults(
            OrchestratorConfig::default(),
        ));

        for candidate in ["orchestrator.yaml", "orchestrator.yml"] {
            if Path::new(candidate).exists() {
                figment = figment.merge(Yaml::file(candidate));
                break;
            }
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(OrchestratorError::InvalidQuery(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed("ORCHESTRATOR_"));

        figment
            .extract()
            .map_err(|e| OrchestratorError::InvalidQuery(format!("invalid configuration: {e}")))
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn call_allowlist(&self) -> Vec<&str> {
        self.cypher_call_allowlist.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_documented_budget() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.overall_timeout_secs, 60);
        assert_eq!(config.llm_timeout_secs, 30);
        assert_eq!(config.graph_timeout_secs, 30);
        assert_eq!(config.embed_dim, 1536);
    }

    #[test]
    fn env_override_takes_precedence_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "planning_model: file-model").unwrap();
        writeln!(file, "cypher_model: file-model").unwrap();
        writeln!(file, "synthesis_model: file-model").unwrap();
        writeln!(file, "overall_timeout_secs: 45").unwrap();

        std::env::set_var("ORCHESTRATOR_OVERALL_TIMEOUT_SECS", "90");
        let config = OrchestratorConfig::load(&Some(file.path().to_path_buf())).unwrap();
        std::env::remove_var("ORCHESTRATOR_OVERALL_TIMEOUT_SECS");

        assert_eq!(config.overall_timeout_secs, 90);
        assert_eq!(config.planning_model, "file-model");
    }
}

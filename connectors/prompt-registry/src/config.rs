use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRegistryConfig {
    pub api_base: String,
    pub api_key: String,
    pub timeout_ms: u64,
    /// Cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,
    pub max_retries: u32,
}

impl Default for PromptRegistryConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3001/api/public".to_string(),
            api_key: String::new(),
            timeout_ms: 5_000,
            cache_ttl_secs: 120,
            max_retries: 2,
        }
    }
}

impl PromptRegistryConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

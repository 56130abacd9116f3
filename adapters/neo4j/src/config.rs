//! Configuration for the Neo4j read-only query adapter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Neo4j connection URI (e.g., bolt://localhost:7687).
    pub uri: String,
    /// Username for a driver role configured with read-only privileges.
    /// Must never be the same role used by the ingestion write path.
    pub user: Option<String>,
    pub password: Option<String>,
    pub max_connections: usize,
    pub connection_timeout_ms: u64,
    /// Per-query timeout; expiry is reported as a graph-timeout error.
    pub query_timeout_ms: u64,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: Some("neo4j_readonly".to_string()),
            password: Some("neo4j".to_string()),
            max_connections: 10,
            connection_timeout_ms: 5000,
            query_timeout_ms: 30_000,
        }
    }
}

impl Neo4jConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_query_timeout(mut self, timeout_ms: u64) -> Self {
        self.query_timeout_ms = timeout_ms;
        self
    }
}

//! Read-only graph query adapter (C3), backed by Neo4j.
//!
//! This adapter never mutates the graph: its `Graph` handle is constructed
//! against a driver role configured for read-only access (see
//! [`Neo4jConfig`]), every query runs through
//! [`GraphQueryAdapter::execute_read`], and a per-query timeout is enforced
//! with `tokio::time::timeout` rather than relying solely on the driver.

use async_trait::async_trait;
use neo4j::{Graph, Query};
use orchestrator_core::errors::GraphError;
use orchestrator_core::traits::{GraphQueryAdapter, GraphRow};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

mod config;
mod queries;
mod utils;

pub use config::Neo4jConfig;
pub use queries::{
    ARTIFACT_SCHEMA_DESCRIPTION, NODE_DETAILS, ONE_HOP_NEIGHBORHOOD, RELATIONSHIP_NEIGHBORHOOD,
    TWO_HOP_NEIGHBORHOOD,
};

/// The row-variable aliases this adapter knows how to pull typed values
/// for. The Cypher generation prompt (C8) is instructed to bind nodes to
/// `a`/`b`/`c` and edges to `r`/`rel`, matching this list and the
/// `RETURN a, r, b` shape the Cypher generation prompt is trained on.
const NODE_ALIASES: &[&str] = &["a", "b", "c"];
const EDGE_ALIASES: &[&str] = &["r", "rel"];

pub struct Neo4jStore {
    graph: Graph,
    config: Neo4jConfig,
}

impl Neo4jStore {
    pub async fn new(config: Neo4jConfig) -> Result<Self, GraphError> {
        info!(uri = %config.uri, "connecting to neo4j (read-only role)");

        let graph = Graph::new(
            &config.uri,
            config.user.as_deref().unwrap_or("neo4j_readonly"),
            config.password.as_deref().unwrap_or("neo4j"),
        )
        .await
        .map_err(|e| GraphError::ConnectionFailed(format!("neo4j connection failed: {e}")))?;

        let store = Self { graph, config };
        store.health_check().await?;
        Ok(store)
    }

    fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.config.query_timeout_ms)
    }

    fn row_to_columns(&self, row: &neo4j::Row) -> Map<String, Value> {
        let mut columns = Map::new();

        for alias in NODE_ALIASES {
            if let Ok(node) = row.get::<neo4j::Node>(alias) {
                columns.insert((*alias).to_string(), Value::Object(utils::node_to_columns(&node)));
            }
        }
        for alias in EDGE_ALIASES {
            if let Ok(rel) = row.get::<neo4j::Relationship>(alias) {
                columns.insert(
                    (*alias).to_string(),
                    Value::Object(utils::relationship_to_columns(&rel)),
                );
            }
        }

        columns
    }
}

#[async_trait]
impl GraphQueryAdapter for Neo4jStore {
    #[instrument(name = "neo4j-query-execution", skip(self, params, timeout))]
    async fn execute_read(
        &self,
        cypher: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Vec<GraphRow>, GraphError> {
        let bound_timeout = timeout.min(self.query_timeout());

        let param_map: HashMap<String, Value> = match params {
            Value::Object(map) => map.into_iter().collect(),
            Value::Null => HashMap::new(),
            other => {
                return Err(GraphError::QueryFailed(format!(
                    "query params must be a JSON object, got: {other}"
                )))
            }
        };

        debug!(%cypher, "executing read-only cypher query");

        let query = Query::new(cypher.to_string()).params(param_map);

        let run = async {
            let mut result = self
                .graph
                .execute(query)
                .await
                .map_err(|e| GraphError::QueryFailed(format!("query execution failed: {e}")))?;

            let mut rows = Vec::new();
            while let Some(row) = result
                .next()
                .await
                .map_err(|e| GraphError::QueryFailed(format!("failed to fetch row: {e}")))?
            {
                rows.push(GraphRow {
                    columns: self.row_to_columns(&row),
                });
            }
            Ok(rows)
        };

        tokio::time::timeout(bound_timeout, run)
            .await
            .map_err(|_| GraphError::Timeout(format!("query exceeded {bound_timeout:?}")))?
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        debug!("performing neo4j health check");
        let query = Query::new(queries::HEALTH_CHECK.to_string());
        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| GraphError::ConnectionFailed(format!("health check failed: {e}")))?;

        result
            .next()
            .await
            .map_err(|e| GraphError::ConnectionFailed(format!("health check result failed: {e}")))?
            .ok_or_else(|| GraphError::ConnectionFailed("health check returned no rows".to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_a_readonly_role() {
        let config = Neo4jConfig::default();
        assert_eq!(config.user.as_deref(), Some("neo4j_readonly"));
        assert_eq!(config.query_timeout_ms, 30_000);
    }

    #[test]
    fn timeout_bound_takes_the_tighter_of_request_and_config() {
        let config = Neo4jConfig::default().with_query_timeout(5_000);
        assert_eq!(config.query_timeout_ms, 5_000);
    }
}

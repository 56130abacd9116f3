//! The metadata registry boundary: campaign lookups backed by Postgres via
//! a `deadpool-postgres` connection pool, the same client/pool stack used
//! elsewhere in this ecosystem for relational collaborators.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use orchestrator_core::errors::GraphError;
use orchestrator_core::traits::MetadataRegistry;
use orchestrator_core::types::{Campaign, SanitizedLabel};
use serde::{Deserialize, Serialize};
use tokio_postgres::NoTls;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub pool_size: usize,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "orchestrator".to_string(),
            password: String::new(),
            dbname: "campaigns".to_string(),
            pool_size: 10,
        }
    }
}

pub struct PostgresMetadataRegistry {
    pool: Pool,
}

impl PostgresMetadataRegistry {
    pub fn new(config: PostgresConfig) -> Result<Self, GraphError> {
        let mut pool_config = PoolConfig::new();
        pool_config.host = Some(config.host);
        pool_config.port = Some(config.port);
        pool_config.user = Some(config.user);
        pool_config.password = Some(config.password);
        pool_config.dbname = Some(config.dbname);
        pool_config.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| GraphError::ConnectionFailed(format!("postgres pool creation failed: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataRegistry for PostgresMetadataRegistry {
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, GraphError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| GraphError::ConnectionFailed(format!("postgres pool checkout failed: {e}")))?;

        debug!(campaign_id = %id, "looking up campaign");

        let row = client
            .query_opt(
                "SELECT id, name, description, graph_label, vector_collection, owner_id, deleted_at \
                 FROM campaigns WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| GraphError::QueryFailed(format!("campaign lookup failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let graph_label: String = row.get("graph_label");
        let graph_label = SanitizedLabel::new(graph_label)
            .map_err(|e| GraphError::QueryFailed(format!("campaign has an unsafe graph label: {e}")))?;

        Ok(Some(Campaign {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            graph_label,
            vector_collection: row.get("vector_collection"),
            owner_id: row.get("owner_id"),
            deleted_at: row.get("deleted_at"),
        }))
    }

    async fn is_note_in_campaign(&self, campaign_id: Uuid, note_id: Uuid) -> Result<bool, GraphError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| GraphError::ConnectionFailed(format!("postgres pool checkout failed: {e}")))?;

        let row = client
            .query_opt(
                "SELECT 1 FROM notes WHERE id = $1 AND campaign_id = $2",
                &[&note_id, &campaign_id],
            )
            .await
            .map_err(|e| GraphError::QueryFailed(format!("note-in-campaign check failed: {e}")))?;

        Ok(row.is_some())
    }
}

//! Per-campaign, per-type semantic search over a Qdrant vector index (C2).

use async_trait::async_trait;
use orchestrator_core::errors::VectorError;
use orchestrator_core::traits::{EmbeddingService, VectorFilter, VectorSearch};
use orchestrator_core::types::{ArtifactHit, Campaign, NoteHit, RelationHit};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

mod config;
mod embedding;

pub use config::{EmbeddingConfig, QdrantConfig};
pub use embedding::HttpEmbeddingService;

pub struct QdrantVectorSearch {
    client: reqwest::Client,
    config: QdrantConfig,
    embeddings: Arc<dyn EmbeddingService>,
    k_max: u8,
}

impl QdrantVectorSearch {
    /// `k_max` is the deployment-configured ceiling on how many hits a
    /// single search may request (`OrchestratorConfig::vector_k_max`); the
    /// caller's requested `k` is clamped to it rather than to a literal.
    pub fn new(config: QdrantConfig, embeddings: Arc<dyn EmbeddingService>, k_max: u8) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .expect("failed to build qdrant http client");
        Self {
            client,
            config,
            embeddings,
            k_max,
        }
    }

    fn filter_value(kind: VectorFilter) -> &'static str {
        match kind {
            VectorFilter::Note => "note",
            VectorFilter::Artifact => "artifact",
            VectorFilter::Relation => "relation",
        }
    }

    async fn search_raw(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
        kind: VectorFilter,
    ) -> Result<Vec<ScoredPoint>, VectorError> {
        let k = k.clamp(1, self.k_max);
        let vector = self.embeddings.embed(query).await?;

        let request_body = json!({
            "vector": vector,
            "limit": k,
            "with_payload": true,
            "filter": {
                "must": [
                    { "key": "type", "match": { "value": Self::filter_value(kind) } }
                ]
            }
        });

        let url = format!(
            "{}/collections/{}/points/search",
            self.config.base_url, campaign.vector_collection
        );

        debug!(collection = %campaign.vector_collection, kind = ?kind, "searching vector collection");

        let mut request = self.client.post(url).json(&request_body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VectorError::SearchFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(VectorError::SearchFailed(format!(
                "qdrant returned {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| VectorError::SearchFailed(format!("malformed qdrant response: {e}")))?;

        Ok(parsed.result)
    }
}

#[async_trait]
impl VectorSearch for QdrantVectorSearch {
    async fn search_notes(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<NoteHit>, VectorError> {
        let points = self.search_raw(campaign, query, k, VectorFilter::Note).await?;
        points
            .into_iter()
            .map(|p| {
                Ok(NoteHit {
                    note_id: p.payload.entity_id()?,
                    title: p.payload.title.unwrap_or_default(),
                    snippet: p.payload.snippet.unwrap_or_default(),
                    score: p.score,
                })
            })
            .collect()
    }

    async fn search_artifacts(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<ArtifactHit>, VectorError> {
        let points = self
            .search_raw(campaign, query, k, VectorFilter::Artifact)
            .await?;
        points
            .into_iter()
            .map(|p| {
                Ok(ArtifactHit {
                    artifact_id: p.payload.entity_id()?,
                    name: p.payload.title.unwrap_or_default(),
                    artifact_type: p.payload.artifact_type.unwrap_or_default(),
                    score: p.score,
                })
            })
            .collect()
    }

    async fn search_relationships(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<RelationHit>, VectorError> {
        let points = self
            .search_raw(campaign, query, k, VectorFilter::Relation)
            .await?;
        points
            .into_iter()
            .map(|p| {
                Ok(RelationHit {
                    relationship_id: p.payload.entity_id()?,
                    source: p.payload.source.unwrap_or_default(),
                    target: p.payload.target.unwrap_or_default(),
                    label: p.payload.title.unwrap_or_default(),
                    score: p.score,
                })
            })
            .collect()
    }

    async fn collection_exists(&self, campaign: &Campaign) -> Result<bool, VectorError> {
        let url = format!(
            "{}/collections/{}",
            self.config.base_url, campaign.vector_collection
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VectorError::SearchFailed(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: Payload,
}

#[derive(Debug, Deserialize, Serialize)]
struct Payload {
    #[serde(rename = "entityId")]
    entity_id: Option<Uuid>,
    #[serde(rename = "type")]
    point_type: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
    #[serde(rename = "artifactType")]
    artifact_type: Option<String>,
    source: Option<Uuid>,
    target: Option<Uuid>,
}

impl Payload {
    fn entity_id(&self) -> Result<Uuid, VectorError> {
        self.entity_id
            .ok_or_else(|| VectorError::SearchFailed("vector point payload missing entityId".to_string()))
    }
}

//! `Embed(text) -> vector[D]`, an OpenAI-compatible embeddings endpoint.

use async_trait::async_trait;
use orchestrator_core::errors::VectorError;
use orchestrator_core::traits::EmbeddingService;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

pub struct HttpEmbeddingService {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingService {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .expect("failed to build embedding http client");
        Self { client, config }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| VectorError::EmbeddingFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VectorError::EmbeddingFailed(format!(
                "embedding service returned {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| VectorError::EmbeddingFailed(format!("malformed embedding response: {e}")))?;

        let vector = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::EmbeddingFailed("embedding response had no data".to_string()))?
            .embedding;

        if vector.len() != self.config.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

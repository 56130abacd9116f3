//! Narrow collaborator interfaces: one trait per external system the
//! orchestrator reaches out to. Each adapter/connector crate implements one
//! of these against a concrete backend; the orchestrator crate only ever
//! depends on the trait object.

use crate::errors::{GraphError, LlmError, PromptError, VectorError};
use crate::types::{ArtifactHit, Campaign, NoteHit, RelationHit};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `Embed(text) -> vector[D]`, where D is the configured embedding
/// dimension.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorError>;

    /// The dimension this service is configured to produce. Used by callers
    /// to fail loudly on mismatch rather than guess.
    fn dimension(&self) -> usize;
}

/// The vector-point kind a search should be filtered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFilter {
    Note,
    Artifact,
    Relation,
}

/// Per-campaign semantic search over the vector index (C2).
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search_notes(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<NoteHit>, VectorError>;

    async fn search_artifacts(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<ArtifactHit>, VectorError>;

    async fn search_relationships(
        &self,
        campaign: &Campaign,
        query: &str,
        k: u8,
    ) -> Result<Vec<RelationHit>, VectorError>;

    /// `CollectionExists(collection) -> bool`; a missing collection is not
    /// an error, it yields an empty result list from the search methods
    /// above.
    async fn collection_exists(&self, campaign: &Campaign) -> Result<bool, VectorError>;
}

/// One row of a graph query result, pre-typing into node/edge shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRow {
    pub columns: serde_json::Map<String, serde_json::Value>,
}

/// `ExecuteRead(cypher, params, timeout) -> rows` — a validated,
/// parameterized, read-only graph query (C3).
#[async_trait]
pub trait GraphQueryAdapter: Send + Sync {
    async fn execute_read(
        &self,
        cypher: &str,
        params: serde_json::Value,
        timeout: std::time::Duration,
    ) -> Result<Vec<GraphRow>, GraphError>;

    async fn health_check(&self) -> Result<(), GraphError>;
}

/// The kind of a prompt template: a single string, or an ordered chat
/// sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptBody {
    Text { body: String },
    Chat { messages: Vec<ChatMessage> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl PromptBody {
    /// Canonical text projection for text-only downstream consumers:
    /// `"[ROLE]: content\n..."`.
    pub fn as_text_projection(&self) -> String {
        match self {
            PromptBody::Text { body } => body.clone(),
            PromptBody::Chat { messages } => messages
                .iter()
                .map(|m| format!("[{}]: {}", m.role.to_uppercase(), m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Replace `{{KEY}}` occurrences with `value`. Unresolved placeholders
    /// are left intact by design — tests rely on this to detect missing
    /// variables.
    pub fn interpolate(self, key: &str, value: &str) -> Self {
        let needle = format!("{{{{{key}}}}}");
        match self {
            PromptBody::Text { body } => PromptBody::Text {
                body: body.replace(&needle, value),
            },
            PromptBody::Chat { messages } => PromptBody::Chat {
                messages: messages
                    .into_iter()
                    .map(|m| ChatMessage {
                        role: m.role,
                        content: m.content.replace(&needle, value),
                    })
                    .collect(),
            },
        }
    }
}

/// A rendered prompt plus the version metadata needed for observability
/// propagation (C4).
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub body: PromptBody,
    pub name: String,
    pub version: String,
}

/// `Fetch(name, label|version, variables) -> rendered prompt + metadata`
/// (C4).
#[async_trait]
pub trait PromptRegistry: Send + Sync {
    async fn fetch(
        &self,
        name: &str,
        label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError>;

    /// Bypasses the read cache; does not evict existing entries.
    async fn fetch_no_cache(
        &self,
        name: &str,
        label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError>;
}

/// Token usage and derived cost for one completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub cost_usd: f64,
}

/// The result of one LLM completion call (C5).
#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub text: String,
    pub usage: Usage,
    pub model_used: String,
}

/// A prompt-registry binding the caller attaches so the client can
/// propagate `langfuse.observation.prompt.{name,version}` to observability.
#[derive(Debug, Clone)]
pub struct PromptBinding {
    pub name: String,
    pub version: String,
}

/// `Chat(model, messages, params) -> {text, usage, modelUsed}` (C5).
#[async_trait]
pub trait LlmConnector: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        prompt_binding: Option<PromptBinding>,
    ) -> Result<CompletionResult, LlmError>;
}

/// `GetCampaign`/`IsNoteInCampaign` — the metadata registry boundary.
#[async_trait]
pub trait MetadataRegistry: Send + Sync {
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, GraphError>;

    async fn is_note_in_campaign(&self, campaign_id: Uuid, note_id: Uuid) -> Result<bool, GraphError>;
}

/// OTLP/HTTP transport of traces/spans carrying GenAI semantic-convention
/// attributes. Implemented as a `tracing_subscriber::Layer` in the server
/// crate; this trait exists so orchestrator code can attach attributes
/// without depending on a concrete exporter.
pub trait SpanAttributes {
    fn record_gen_ai(
        &self,
        system: &str,
        request_model: &str,
        response_model: &str,
        usage: &Usage,
    );
}

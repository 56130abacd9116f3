//! Data model for the assistant orchestrator: campaigns, notes, artifacts,
//! relationships, vector points, and the transient values produced while
//! answering one query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A campaign's stable graph-label, restricted to `[A-Za-z0-9_]`.
///
/// Constructed only via [`SanitizedLabel::new`], which is the single place
/// user-influenced campaign names are allowed to become part of a Cypher
/// query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SanitizedLabel(String);

impl SanitizedLabel {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, crate::errors::ValidationError> {
        let raw = raw.as_ref();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(crate::errors::ValidationError::UnsafeLabel(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn artifact_node_label(&self) -> String {
        format!("{}_Artifact", self.0)
    }
}

impl std::fmt::Display for SanitizedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tabletop-RPG campaign, as known to the metadata registry.
///
/// Read-only from the orchestrator's perspective; it never writes a
/// `Campaign` back to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub graph_label: SanitizedLabel,
    pub vector_collection: String,
    pub owner_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Campaign {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A short source-of-truth text, ingested outside this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_override: bool,
}

/// A node in the campaign's property graph: a character, location, item, or
/// event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub name: String,
    pub artifact_type: String,
    pub description: String,
    pub campaign_id: Uuid,
    pub note_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A directed edge between two artifacts of the same campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub label: String,
    pub description: String,
    pub reasoning: String,
    pub note_ids: Vec<Uuid>,
    pub campaign_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The payload discriminator of a point in the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorPointKind {
    Note,
    Artifact,
    Relation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteHit {
    pub note_id: Uuid,
    pub title: String,
    pub snippet: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHit {
    pub artifact_id: Uuid,
    pub name: String,
    pub artifact_type: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationHit {
    pub relationship_id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub label: String,
    pub score: f32,
}

/// The closed action set the Planner chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SearchNotes,
    SearchArtifactsThenGraph,
    SearchRelationsThenGraph,
    CombinedSearch,
    ClarificationNeeded,
    OutOfScope,
}

impl Action {
    pub fn requires_graph(self) -> bool {
        matches!(
            self,
            Action::SearchArtifactsThenGraph | Action::SearchRelationsThenGraph
        )
    }

    pub fn as_wire_str(self) -> &'static str {
        match self {
            Action::SearchNotes => "search_notes",
            Action::SearchArtifactsThenGraph => "search_artifacts_then_graph",
            Action::SearchRelationsThenGraph => "search_relations_then_graph",
            Action::CombinedSearch => "combined_search",
            Action::ClarificationNeeded => "clarification_needed",
            Action::OutOfScope => "out_of_scope",
        }
    }
}

/// The requested shape of a graph result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphScope {
    Relationships,
    FullSubgraph,
    NodeDetails,
}

impl GraphScope {
    /// Traversal depth in hops, per the scope -> depth mapping used when
    /// prompting the Cypher generator.
    pub fn hop_depth(self) -> u8 {
        match self {
            GraphScope::Relationships => 1,
            GraphScope::FullSubgraph => 2,
            GraphScope::NodeDetails => 0,
        }
    }
}

/// The Planner's output: an action plus whatever parameters that action
/// needs. Transient, owned by the orchestrating request frame.
#[derive(Debug, Clone)]
pub struct PlanningDecision {
    pub action: Action,
    pub reasoning: String,
    pub artifact_search_query: Option<String>,
    pub expected_cypher_scope: Option<GraphScope>,
    pub clarification_message: Option<String>,
    /// Set when the LLM named an action outside the closed set and the
    /// Planner fell back to `search_notes`.
    pub fell_back_from_unknown_action: bool,
}

/// A graph node as returned to an HTTP caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub description: String,
    pub campaign_uuid: Uuid,
    pub note_ids: Vec<Uuid>,
}

/// A graph edge as returned to an HTTP caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDto {
    pub id: Uuid,
    pub source: Uuid,
    pub target: Uuid,
    pub label: String,
    pub description: String,
    pub reasoning: String,
    pub note_ids: Vec<Uuid>,
}

/// Nodes plus edges produced by executing a validated Cypher query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

/// A note citation surfaced alongside a synthesized answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub note_id: Uuid,
    pub note_title: String,
}

/// The transient aggregation of vector results (and, if C3 ran, a graph
/// payload) gathered for one request.
#[derive(Debug, Clone, Default)]
pub struct EvidenceBundle {
    pub candidate_notes: Vec<NoteHit>,
    pub found_artifact: Option<ArtifactHit>,
    pub found_relationship: Option<RelationHit>,
    pub graph_payload: Option<GraphPayload>,
}

impl EvidenceBundle {
    /// True when not a single vector adapter produced anything to ground an
    /// answer in.
    pub fn is_empty(&self) -> bool {
        self.candidate_notes.is_empty()
            && self.found_artifact.is_none()
            && self.found_relationship.is_none()
    }

    /// Sources in the same relevance order as `candidate_notes` (score
    /// desc, then note id), since that's the order the collector already
    /// sorted them into.
    pub fn sources(&self) -> Vec<SourceRef> {
        self.candidate_notes
            .iter()
            .map(|hit| SourceRef {
                note_id: hit.note_id,
                note_title: hit.title.clone(),
            })
            .collect()
    }
}

/// The tagged wire response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Text,
    TextAndGraph,
    ClarificationNeeded,
    OutOfScope,
    Error,
}

/// The fully rendered answer to one query. This is the value memoized by
/// the query result cache and returned over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub response_type: ResponseType,
    pub error_type: Option<String>,
    pub text_response: String,
    pub graph_data: Option<GraphPayload>,
    pub sources: Vec<SourceRef>,
    pub executed_actions: Vec<String>,
    pub debug_info: Option<serde_json::Value>,
}

impl AssistantResponse {
    pub fn is_cacheable(&self) -> bool {
        self.response_type != ResponseType::Error
    }
}

//! Cypher Generator (C8): prompts the LLM for a candidate read-only query
//! targeting a found artifact or relationship, using the same
//! fetch-prompt/call-LLM/parse-JSON shape as the Planner (C6). The returned
//! string is not validated here — the caller hands it to the Cypher
//! validator (C1) before it ever reaches the graph store.

use orchestrator_core::errors::{OrchestratorError, PlanningError};
use orchestrator_core::traits::{ChatMessage, LlmConnector, PromptBinding, PromptBody, PromptRegistry};
use orchestrator_core::types::{Campaign, GraphScope};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const PROMPT_NAME: &str = "assistant-cypher-generation";
const PROMPT_LABEL: &str = "production";

/// Must describe the same schema `adapters/neo4j/src/queries.rs` actually
/// queries against.
const ARTIFACT_SCHEMA_DESCRIPTION: &str = r#"
Node label: {campaignLabel}_Artifact
Node properties: id (uuid), name (string), type (string), description (string),
  campaign_uuid (uuid), note_ids (list of uuid)
Edge properties: id (uuid), label (string), description (string), reasoning (string),
  campaign_uuid (uuid), note_ids (list of uuid)
"#;

pub enum CypherTarget {
    Artifact { id: Uuid, name: String, artifact_type: String },
    Relationship { id: Uuid },
}

pub struct CypherGenerator {
    prompts: Arc<dyn PromptRegistry>,
    llm: Arc<dyn LlmConnector>,
    model: String,
}

impl CypherGenerator {
    pub fn new(prompts: Arc<dyn PromptRegistry>, llm: Arc<dyn LlmConnector>, model: String) -> Self {
        Self { prompts, llm, model }
    }

    #[instrument(name = "cypher-generation", skip(self, campaign, target), fields(campaign_id = %campaign.id, scope = scope_wire_str(scope)))]
    pub async fn generate(
        &self,
        campaign: &Campaign,
        scope: GraphScope,
        target: CypherTarget,
    ) -> Result<String, OrchestratorError> {
        let hop_depth = scope.hop_depth().to_string();
        let campaign_uuid = campaign.id.to_string();
        let campaign_label = campaign.graph_label.as_str().to_string();
        let artifact_label = campaign.graph_label.artifact_node_label();

        let (target_id, target_name, target_type) = match &target {
            CypherTarget::Artifact { id, name, artifact_type } => {
                (id.to_string(), name.clone(), artifact_type.clone())
            }
            CypherTarget::Relationship { id } => (id.to_string(), String::new(), String::new()),
        };

        let rendered = self
            .prompts
            .fetch(
                PROMPT_NAME,
                PROMPT_LABEL,
                &[
                    ("campaignUuid", campaign_uuid.as_str()),
                    ("campaignLabel", campaign_label.as_str()),
                    ("artifactLabel", artifact_label.as_str()),
                    ("schema", ARTIFACT_SCHEMA_DESCRIPTION),
                    ("scope", scope_wire_str(scope)),
                    ("hopDepth", hop_depth.as_str()),
                    ("targetId", target_id.as_str()),
                    ("targetName", target_name.as_str()),
                    ("targetType", target_type.as_str()),
                ],
            )
            .await?;

        let messages = as_chat_messages(&rendered.body);
        let binding = PromptBinding {
            name: rendered.name,
            version: rendered.version,
        };

        let completion = self
            .llm
            .complete(&self.model, &messages, Some(binding))
            .await
            .map_err(|e| OrchestratorError::Planning(PlanningError::Llm(e)))?;

        parse_cypher(&completion.text)
    }
}

fn scope_wire_str(scope: GraphScope) -> &'static str {
    match scope {
        GraphScope::Relationships => "relationships",
        GraphScope::FullSubgraph => "full_subgraph",
        GraphScope::NodeDetails => "node_details",
    }
}

fn as_chat_messages(body: &PromptBody) -> Vec<ChatMessage> {
    match body {
        PromptBody::Chat { messages } => messages.clone(),
        PromptBody::Text { body } => vec![ChatMessage {
            role: "user".to_string(),
            content: body.clone(),
        }],
    }
}

#[derive(Debug, Deserialize)]
struct CypherWire {
    #[allow(dead_code)]
    reasoning: String,
    cypher_query: String,
}

fn parse_cypher(text: &str) -> Result<String, OrchestratorError> {
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let wire: CypherWire = serde_json::from_str(cleaned).map_err(|e| {
        OrchestratorError::Planning(PlanningError::MalformedDecision(format!(
            "could not parse generated cypher: {e}. content: '{cleaned}'"
        )))
    })?;

    Ok(wire.cypher_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_cypher_query_out_of_the_json_envelope() {
        let text = r#"{"reasoning": "one hop", "cypher_query": "MATCH (a) RETURN a"}"#;
        assert_eq!(parse_cypher(text).unwrap(), "MATCH (a) RETURN a");
    }

    #[test]
    fn strips_markdown_fences_before_parsing() {
        let text = "```json\n{\"reasoning\": \"x\", \"cypher_query\": \"MATCH (a) RETURN a\"}\n```";
        assert_eq!(parse_cypher(text).unwrap(), "MATCH (a) RETURN a");
    }
}

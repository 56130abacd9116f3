//! Planner (C6): decides which action answers a query by asking the LLM for
//! a JSON decision, the same way the prior system's extraction connector
//! asked for a JSON envelope — strip markdown fences, `serde_json::from_str`,
//! validate, fall back on anything unrecognized.

use orchestrator_core::errors::{OrchestratorError, PlanningError};
use orchestrator_core::traits::{ChatMessage, LlmConnector, PromptBinding, PromptRegistry};
use orchestrator_core::types::{Action, Campaign, GraphScope, PlanningDecision};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PROMPT_NAME: &str = "assistant-planning-v1";
const PROMPT_LABEL: &str = "production";

pub struct Planner {
    prompts: Arc<dyn PromptRegistry>,
    llm: Arc<dyn LlmConnector>,
    model: String,
}

impl Planner {
    pub fn new(prompts: Arc<dyn PromptRegistry>, llm: Arc<dyn LlmConnector>, model: String) -> Self {
        Self { prompts, llm, model }
    }

    #[instrument(name = "planning-decision", skip(self, campaign, query), fields(campaign_id = %campaign.id))]
    pub async fn plan(&self, campaign: &Campaign, query: &str) -> Result<PlanningDecision, OrchestratorError> {
        let rendered = self
            .prompts
            .fetch(
                PROMPT_NAME,
                PROMPT_LABEL,
                &[
                    ("query", query),
                    ("campaignName", &campaign.name),
                    ("campaignDescription", &campaign.description),
                    ("categories", ""),
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

        parse_decision(&completion.text)
    }
}

fn as_chat_messages(body: &orchestrator_core::traits::PromptBody) -> Vec<ChatMessage> {
    use orchestrator_core::traits::PromptBody;
    match body {
        PromptBody::Chat { messages } => messages.clone(),
        PromptBody::Text { body } => vec![ChatMessage {
            role: "user".to_string(),
            content: body.clone(),
        }],
    }
}

#[derive(Debug, Deserialize)]
struct DecisionWire {
    action: String,
    reasoning: String,
    #[serde(default)]
    parameters: ParametersWire,
}

#[derive(Debug, Default, Deserialize)]
struct ParametersWire {
    artifact_search_query: Option<String>,
    expected_cypher_scope: Option<String>,
    clarification_message: Option<String>,
}

fn parse_decision(text: &str) -> Result<PlanningDecision, OrchestratorError> {
    let cleaned = strip_markdown_fences(text);

    let wire: DecisionWire = match serde_json::from_str(cleaned) {
        Ok(wire) => wire,
        Err(e) => {
            warn!(error = %e, "planning decision was not valid json, falling back to search_notes");
            return Ok(PlanningDecision {
                action: Action::SearchNotes,
                reasoning: "planner response could not be parsed".to_string(),
                artifact_search_query: None,
                expected_cypher_scope: None,
                clarification_message: None,
                fell_back_from_unknown_action: true,
            });
        }
    };

    let (action, fell_back) = match wire.action.as_str() {
        "search_notes" => (Action::SearchNotes, false),
        "search_artifacts_then_graph" => (Action::SearchArtifactsThenGraph, false),
        "search_relations_then_graph" => (Action::SearchRelationsThenGraph, false),
        "combined_search" => (Action::CombinedSearch, false),
        "clarification_needed" => (Action::ClarificationNeeded, false),
        "out_of_scope" => (Action::OutOfScope, false),
        other => {
            warn!(action = other, "planner named an action outside the closed set, falling back to search_notes");
            (Action::SearchNotes, true)
        }
    };

    let expected_cypher_scope = wire.parameters.expected_cypher_scope.as_deref().and_then(|s| match s {
        "relationships" => Some(GraphScope::Relationships),
        "full_subgraph" => Some(GraphScope::FullSubgraph),
        "node_details" => Some(GraphScope::NodeDetails),
        _ => None,
    });

    debug!(action = action.as_wire_str(), fell_back, "planning decision parsed");

    Ok(PlanningDecision {
        action,
        reasoning: wire.reasoning,
        artifact_search_query: wire.parameters.artifact_search_query,
        expected_cypher_scope,
        clarification_message: wire.parameters.clarification_message,
        fell_back_from_unknown_action: fell_back,
    })
}

fn strip_markdown_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

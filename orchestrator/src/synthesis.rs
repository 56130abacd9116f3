//! Synthesizer (C9): turns an evidence bundle into a grounded natural
//! language answer. Same prompt/LLM-call shape as the Planner and Cypher
//! Generator, but the completion's text is the answer itself, not a JSON
//! envelope.

use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::traits::{ChatMessage, LlmConnector, PromptBinding, PromptBody, PromptRegistry};
use orchestrator_core::types::{Action, Campaign, EvidenceBundle};
use std::sync::Arc;
use tracing::instrument;

const PROMPT_NAME: &str = "assistant-synthesis";
const PROMPT_LABEL: &str = "production";

const NO_EVIDENCE_REPLY: &str = "I couldn't find anything in this campaign's notes, artifacts, \
or relationships relevant to that question. Try rephrasing, or ask about a specific character, \
place, or event.";

pub struct Synthesizer {
    prompts: Arc<dyn PromptRegistry>,
    llm: Arc<dyn LlmConnector>,
    model: String,
}

impl Synthesizer {
    pub fn new(prompts: Arc<dyn PromptRegistry>, llm: Arc<dyn LlmConnector>, model: String) -> Self {
        Self { prompts, llm, model }
    }

    #[instrument(
        name = "response-synthesis",
        skip(self, query, campaign, evidence),
        fields(campaign_id = %campaign.id, action = action.as_wire_str())
    )]
    pub async fn synthesize(
        &self,
        query: &str,
        campaign: &Campaign,
        action: Action,
        evidence: &EvidenceBundle,
    ) -> Result<String, OrchestratorError> {
        // The Synthesizer must never invent sources: with nothing to ground
        // an answer in, the "no data" reply is returned directly rather
        // than asked of the LLM.
        if evidence.is_empty() {
            return Ok(NO_EVIDENCE_REPLY.to_string());
        }

        let vector_results = serde_json::to_string(&VectorResultsView {
            notes: &evidence.candidate_notes,
            artifact: evidence.found_artifact.as_ref(),
            relationship: evidence.found_relationship.as_ref(),
        })
        .unwrap_or_default();

        let graph_results = evidence
            .graph_payload
            .as_ref()
            .map(|g| serde_json::to_string(g).unwrap_or_default())
            .unwrap_or_default();

        let rendered = self
            .prompts
            .fetch(
                PROMPT_NAME,
                PROMPT_LABEL,
                &[
                    ("originalQuery", query),
                    ("action", action.as_wire_str()),
                    ("vectorResults", vector_results.as_str()),
                    ("graphResults", graph_results.as_str()),
                    ("campaignName", &campaign.name),
                ],
            )
            .await
            .map_err(|e| OrchestratorError::Synthesis(format!("prompt fetch failed: {e}")))?;

        let messages = as_chat_messages(&rendered.body);
        let binding = PromptBinding {
            name: rendered.name,
            version: rendered.version,
        };

        let completion = self
            .llm
            .complete(&self.model, &messages, Some(binding))
            .await
            .map_err(|e| OrchestratorError::Synthesis(e.to_string()))?;

        let text = completion.text.trim().to_string();
        if text.is_empty() {
            return Err(OrchestratorError::Synthesis("llm returned an empty answer".to_string()));
        }
        Ok(text)
    }
}

#[derive(serde::Serialize)]
struct VectorResultsView<'a> {
    notes: &'a [orchestrator_core::types::NoteHit],
    artifact: Option<&'a orchestrator_core::types::ArtifactHit>,
    relationship: Option<&'a orchestrator_core::types::RelationHit>,
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

//! Orchestrator (C11): the ten-step request pipeline, implemented as one
//! explicit `async fn` of sequential `.await?` calls, instrumented with
//! `tracing::instrument` spans per the `assistant-query` trace taxonomy.

use orchestrator_core::cache::QueryResultCache;
use orchestrator_core::config::OrchestratorConfig;
use orchestrator_core::cypher_validator;
use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::traits::{GraphQueryAdapter, MetadataRegistry};
use orchestrator_core::types::{
    Action, AssistantResponse, Campaign, GraphScope, ResponseType,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::collector::DataCollector;
use crate::cypher_gen::{CypherGenerator, CypherTarget};
use crate::graph_assembly::assemble_graph_payload;
use crate::planner::Planner;
use crate::synthesis::Synthesizer;

pub struct Orchestrator {
    metadata: Arc<dyn MetadataRegistry>,
    graph: Arc<dyn GraphQueryAdapter>,
    cache: Arc<QueryResultCache>,
    planner: Planner,
    collector: DataCollector,
    cypher_gen: CypherGenerator,
    synthesizer: Synthesizer,
    config: OrchestratorConfig,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        metadata: Arc<dyn MetadataRegistry>,
        graph: Arc<dyn GraphQueryAdapter>,
        cache: Arc<QueryResultCache>,
        planner: Planner,
        collector: DataCollector,
        cypher_gen: CypherGenerator,
        synthesizer: Synthesizer,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            metadata,
            graph,
            cache,
            planner,
            collector,
            cypher_gen,
            synthesizer,
            config,
        }
    }

    /// Steps 1-3, 9-10 of the pipeline. Validation failures
    /// (`invalid-query`, `campaign-not-found`) propagate as `Err` so the
    /// HTTP layer can surface them as 4xx; every other failure is converted
    /// into an in-band `error` response before this returns.
    #[instrument(name = "assistant-query", skip(self, query), fields(request_id = %Uuid::new_v4()))]
    pub async fn handle_query(
        &self,
        campaign_id: Uuid,
        query: &str,
    ) -> Result<AssistantResponse, OrchestratorError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(OrchestratorError::InvalidQuery("query must not be blank".to_string()));
        }
        if trimmed.chars().count() > self.config.max_query_length {
            return Err(OrchestratorError::InvalidQuery(format!(
                "query exceeds the maximum of {} characters",
                self.config.max_query_length
            )));
        }

        let campaign = self.load_campaign(campaign_id).await?;

        if let Some(cached) = self.cache.get(campaign_id, trimmed) {
            debug!("query result cache hit");
            return Ok(cached);
        }

        let guard = self.cache.in_flight_guard(campaign_id, trimmed);
        let _permit = guard.lock().await;
        if let Some(cached) = self.cache.get(campaign_id, trimmed) {
            return Ok(cached);
        }

        let response = match tokio::time::timeout(
            self.config.overall_timeout(),
            self.run_pipeline(&campaign, trimmed),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(error = %err, "pipeline failed, converting to an in-band error response");
                self.error_response(err)
            }
            Err(_) => {
                warn!("pipeline exceeded the overall request budget");
                self.error_response(OrchestratorError::OverallTimeout)
            }
        };

        self.cache.put(campaign_id, trimmed, response.clone());
        Ok(response)
    }

    async fn load_campaign(&self, campaign_id: Uuid) -> Result<Campaign, OrchestratorError> {
        let campaign = self
            .metadata
            .get_campaign(campaign_id)
            .await
            .map_err(OrchestratorError::Graph)?
            .filter(|c| !c.is_deleted())
            .ok_or(OrchestratorError::CampaignNotFound(campaign_id))?;
        Ok(campaign)
    }

    /// Steps 4-8: plan, collect, optionally generate/validate/execute a
    /// graph query, then synthesize.
    async fn run_pipeline(&self, campaign: &Campaign, query: &str) -> Result<AssistantResponse, OrchestratorError> {
        let mut executed_actions = Vec::new();

        let decision = self.planner.plan(campaign, query).await?;
        if decision.fell_back_from_unknown_action {
            executed_actions.push("action_fallback:search_notes".to_string());
        }
        executed_actions.push(decision.action.as_wire_str().to_string());

        if decision.action == Action::ClarificationNeeded {
            return Ok(AssistantResponse {
                response_type: ResponseType::ClarificationNeeded,
                error_type: None,
                text_response: decision
                    .clarification_message
                    .clone()
                    .unwrap_or_else(|| "Could you clarify what you're asking about?".to_string()),
                graph_data: None,
                sources: Vec::new(),
                executed_actions,
                debug_info: None,
            });
        }

        if decision.action == Action::OutOfScope {
            return Ok(AssistantResponse {
                response_type: ResponseType::OutOfScope,
                error_type: None,
                text_response: "That's outside what I can help with for this campaign.".to_string(),
                graph_data: None,
                sources: Vec::new(),
                executed_actions,
                debug_info: None,
            });
        }

        let mut evidence = self
            .collector
            .collect(campaign, &decision, query, self.config.vector_k_default)
            .await?;

        if decision.action.requires_graph() {
            let scope = decision.expected_cypher_scope.unwrap_or(GraphScope::Relationships);
            let target = match decision.action {
                Action::SearchArtifactsThenGraph => evidence.found_artifact.as_ref().map(|hit| CypherTarget::Artifact {
                    id: hit.artifact_id,
                    name: hit.name.clone(),
                    artifact_type: hit.artifact_type.clone(),
                }),
                Action::SearchRelationsThenGraph => evidence
                    .found_relationship
                    .as_ref()
                    .map(|hit| CypherTarget::Relationship { id: hit.relationship_id }),
                _ => None,
            };

            if let Some(target) = target {
                let cypher = self.cypher_gen.generate(campaign, scope, target).await?;

                cypher_validator::validate(&cypher, &self.config.call_allowlist())
                    .map_err(|reason| OrchestratorError::InvalidCypher { query: cypher.clone(), reason })?;

                let params = serde_json::json!({ "campaignUuid": campaign.id.to_string() });
                let rows = self
                    .graph
                    .execute_read(&cypher, params, self.config.graph_timeout())
                    .await?;

                evidence.graph_payload = Some(assemble_graph_payload(&rows));
            }
        }

        let text_response = self
            .synthesizer
            .synthesize(query, campaign, decision.action, &evidence)
            .await?;

        let has_graph = evidence
            .graph_payload
            .as_ref()
            .map(|g| !g.nodes.is_empty())
            .unwrap_or(false);

        info!(action = decision.action.as_wire_str(), has_graph, "query answered");

        Ok(AssistantResponse {
            response_type: if has_graph { ResponseType::TextAndGraph } else { ResponseType::Text },
            error_type: None,
            text_response,
            graph_data: if has_graph { evidence.graph_payload } else { None },
            sources: evidence.sources(),
            executed_actions,
            debug_info: None,
        })
    }

    fn error_response(&self, err: OrchestratorError) -> AssistantResponse {
        let kind = err.kind();
        let debug_info = match &err {
            OrchestratorError::InvalidCypher { query, .. } => {
                Some(serde_json::json!({ "generatedCypher": query, "detail": err.to_string() }))
            }
            _ if self.config.env != "production" => Some(serde_json::json!({ "detail": err.to_string() })),
            _ => None,
        };

        AssistantResponse {
            response_type: ResponseType::Error,
            error_type: Some(kind.to_string()),
            text_response: user_facing_message(&err),
            graph_data: None,
            sources: Vec::new(),
            executed_actions: Vec::new(),
            debug_info,
        }
    }
}

fn user_facing_message(err: &OrchestratorError) -> String {
    match err {
        OrchestratorError::Synthesis(_) => "An unexpected error occurred".to_string(),
        OrchestratorError::OverallTimeout => {
            "Your request took too long to process. Please try again.".to_string()
        }
        OrchestratorError::InvalidCypher { .. } => {
            "I generated an unsafe query internally and stopped before running it.".to_string()
        }
        OrchestratorError::Retrieval(_) => {
            "I couldn't retrieve anything for that question right now. Please try again shortly.".to_string()
        }
        _ => "I ran into a problem answering that question. Please try again.".to_string(),
    }
}

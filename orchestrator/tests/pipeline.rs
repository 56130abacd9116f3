//! End-to-end exercises of `Orchestrator::handle_query` against
//! hand-written trait-object doubles for every external collaborator
//! (metadata registry, graph store, vector search, prompt registry, LLM) —
//! no live services, the same way this workspace's other integration
//! suites stand in for Neo4j/Qdrant/the LLM provider with fakes behind the
//! shared trait boundaries.

use async_trait::async_trait;
use orchestrator::{CypherGenerator, DataCollector, Orchestrator, Planner, Synthesizer};
use orchestrator_core::cache::QueryResultCache;
use orchestrator_core::config::OrchestratorConfig;
use orchestrator_core::errors::{GraphError, LlmError, PromptError, VectorError};
use orchestrator_core::traits::{
    ChatMessage, CompletionResult, GraphQueryAdapter, GraphRow, LlmConnector, MetadataRegistry,
    PromptBinding, PromptBody, PromptRegistry, RenderedPrompt, Usage, VectorSearch,
};
use orchestrator_core::types::{ArtifactHit, Campaign, NoteHit, RelationHit, ResponseType, SanitizedLabel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct FixedMetadata {
    campaign: Campaign,
}

#[async_trait]
impl MetadataRegistry for FixedMetadata {
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, GraphError> {
        if id == self.campaign.id {
            Ok(Some(self.campaign.clone()))
        } else {
            Ok(None)
        }
    }

    async fn is_note_in_campaign(&self, _campaign_id: Uuid, _note_id: Uuid) -> Result<bool, GraphError> {
        Ok(true)
    }
}

/// A metadata registry double holding more than one campaign, for
/// asserting that per-campaign state never leaks across ids.
struct MultiCampaignMetadata {
    campaigns: Vec<Campaign>,
}

#[async_trait]
impl MetadataRegistry for MultiCampaignMetadata {
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, GraphError> {
        Ok(self.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn is_note_in_campaign(&self, _campaign_id: Uuid, _note_id: Uuid) -> Result<bool, GraphError> {
        Ok(true)
    }
}

struct EmptyGraph;

#[async_trait]
impl GraphQueryAdapter for EmptyGraph {
    async fn execute_read(
        &self,
        _cypher: &str,
        _params: serde_json::Value,
        _timeout: Duration,
    ) -> Result<Vec<GraphRow>, GraphError> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        Ok(())
    }
}

/// Returns whatever rows it was constructed with, regardless of the
/// cypher it's handed.
struct ScriptedGraph {
    rows: Vec<GraphRow>,
}

#[async_trait]
impl GraphQueryAdapter for ScriptedGraph {
    async fn execute_read(
        &self,
        _cypher: &str,
        _params: serde_json::Value,
        _timeout: Duration,
    ) -> Result<Vec<GraphRow>, GraphError> {
        Ok(self.rows.clone())
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        Ok(())
    }
}

/// Counts every call made to `execute_read`, so tests can assert a graph
/// adapter was never reached.
struct CountingGraph {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphQueryAdapter for CountingGraph {
    async fn execute_read(
        &self,
        _cypher: &str,
        _params: serde_json::Value,
        _timeout: Duration,
    ) -> Result<Vec<GraphRow>, GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        Ok(())
    }
}

/// Returns one fixed note hit from `search_notes`, nothing from the other
/// two methods.
struct SingleNoteVectorSearch;

#[async_trait]
impl VectorSearch for SingleNoteVectorSearch {
    async fn search_notes(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<NoteHit>, VectorError> {
        Ok(vec![NoteHit {
            note_id: Uuid::new_v4(),
            title: "The Siege of Brindlewood".to_string(),
            snippet: "Goblin warbands overran the eastern watchtower.".to_string(),
            score: 0.91,
        }])
    }

    async fn search_artifacts(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<ArtifactHit>, VectorError> {
        Ok(Vec::new())
    }

    async fn search_relationships(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<RelationHit>, VectorError> {
        Ok(Vec::new())
    }

    async fn collection_exists(&self, _campaign: &Campaign) -> Result<bool, VectorError> {
        Ok(true)
    }
}

/// A fully scriptable vector search double: every method returns a fixed
/// list, or a failure, by construction. Used to exercise `combined_search`
/// fan-out determinism and graceful degradation.
#[derive(Default, Clone)]
struct ScriptedVectorSearch {
    notes: Vec<NoteHit>,
    artifacts: Vec<ArtifactHit>,
    relationships: Vec<RelationHit>,
    fail_notes: bool,
    fail_artifacts: bool,
    fail_relationships: bool,
}

#[async_trait]
impl VectorSearch for ScriptedVectorSearch {
    async fn search_notes(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<NoteHit>, VectorError> {
        if self.fail_notes {
            Err(VectorError::SearchFailed("note search unavailable".to_string()))
        } else {
            Ok(self.notes.clone())
        }
    }

    async fn search_artifacts(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<ArtifactHit>, VectorError> {
        if self.fail_artifacts {
            Err(VectorError::SearchFailed("artifact search unavailable".to_string()))
        } else {
            Ok(self.artifacts.clone())
        }
    }

    async fn search_relationships(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<RelationHit>, VectorError> {
        if self.fail_relationships {
            Err(VectorError::SearchFailed("relationship search unavailable".to_string()))
        } else {
            Ok(self.relationships.clone())
        }
    }

    async fn collection_exists(&self, _campaign: &Campaign) -> Result<bool, VectorError> {
        Ok(true)
    }
}

/// A campaign-aware vector search double: the note it returns is derived
/// from the campaign passed in, so two campaigns never see each other's
/// data.
struct PerCampaignVectorSearch;

#[async_trait]
impl VectorSearch for PerCampaignVectorSearch {
    async fn search_notes(&self, campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<NoteHit>, VectorError> {
        Ok(vec![NoteHit {
            note_id: Uuid::new_v4(),
            title: format!("Notes for {}", campaign.name),
            snippet: format!("Events scoped to the {} collection.", campaign.vector_collection),
            score: 0.5,
        }])
    }

    async fn search_artifacts(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<ArtifactHit>, VectorError> {
        Ok(Vec::new())
    }

    async fn search_relationships(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<RelationHit>, VectorError> {
        Ok(Vec::new())
    }

    async fn collection_exists(&self, _campaign: &Campaign) -> Result<bool, VectorError> {
        Ok(true)
    }
}

/// Counts every call made to any of its vector search methods, so tests
/// can assert the collector was never reached.
struct CountingVectorSearch {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl VectorSearch for CountingVectorSearch {
    async fn search_notes(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<NoteHit>, VectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn search_artifacts(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<ArtifactHit>, VectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn search_relationships(&self, _campaign: &Campaign, _query: &str, _k: u8) -> Result<Vec<RelationHit>, VectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn collection_exists(&self, _campaign: &Campaign) -> Result<bool, VectorError> {
        Ok(true)
    }
}

/// A prompt registry double that just echoes `variables` into a single chat
/// message, so the LLM double below can read them back out.
struct EchoPromptRegistry;

#[async_trait]
impl PromptRegistry for EchoPromptRegistry {
    async fn fetch(
        &self,
        name: &str,
        _label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError> {
        let content = variables.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(";");
        Ok(RenderedPrompt {
            body: PromptBody::Chat {
                messages: vec![ChatMessage { role: "user".to_string(), content }],
            },
            name: name.to_string(),
            version: "1".to_string(),
        })
    }

    async fn fetch_no_cache(
        &self,
        name: &str,
        label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError> {
        self.fetch(name, label_or_version, variables).await
    }
}

/// An LLM double that scripts a planning decision for `assistant-planning-v1`,
/// an optional generated-cypher envelope for `assistant-cypher-generation`,
/// and an optional prose answer for `assistant-synthesis` (a canned answer
/// otherwise). Every call increments a shared counter so tests can assert
/// how many times the LLM was actually invoked.
struct ScriptedLlm {
    planning_decision_json: String,
    cypher_json: Option<String>,
    synthesis_text: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLlm {
    fn new(planning_decision_json: &str) -> Self {
        Self {
            planning_decision_json: planning_decision_json.to_string(),
            cypher_json: None,
            synthesis_text: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl LlmConnector for ScriptedLlm {
    async fn complete(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _prompt_binding: Option<PromptBinding>,
    ) -> Result<CompletionResult, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let joined = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join(" ");
        let text = if joined.contains("targetId=") {
            self.cypher_json.clone().unwrap_or_else(|| {
                r#"{"reasoning": "one hop", "cypher_query": "MATCH (a {campaign_uuid: $campaignUuid}) RETURN a"}"#
                    .to_string()
            })
        } else if joined.contains("originalQuery=") {
            self.synthesis_text
                .clone()
                .unwrap_or_else(|| "The eastern watchtower fell during a goblin raid.".to_string())
        } else {
            self.planning_decision_json.clone()
        };

        Ok(CompletionResult {
            text,
            usage: Usage::default(),
            model_used: "test-model".to_string(),
        })
    }
}

fn test_campaign() -> Campaign {
    Campaign {
        id: Uuid::new_v4(),
        name: "The Brindlewood Campaign".to_string(),
        description: "A border-kingdom campaign beset by goblin incursions.".to_string(),
        graph_label: SanitizedLabel::new("brindlewood").unwrap(),
        vector_collection: "brindlewood".to_string(),
        owner_id: Uuid::new_v4(),
        deleted_at: None,
    }
}

struct OrchestratorArgs {
    metadata: Arc<dyn MetadataRegistry>,
    vector: Arc<dyn VectorSearch>,
    graph: Arc<dyn GraphQueryAdapter>,
    llm: Arc<dyn LlmConnector>,
    cache: Arc<QueryResultCache>,
}

fn build_orchestrator_full(args: OrchestratorArgs) -> Orchestrator {
    let prompts: Arc<dyn PromptRegistry> = Arc::new(EchoPromptRegistry);
    let config = OrchestratorConfig::default();

    let planner = Planner::new(prompts.clone(), args.llm.clone(), config.planning_model.clone());
    let collector = DataCollector::new(args.vector);
    let cypher_gen = CypherGenerator::new(prompts.clone(), args.llm.clone(), config.cypher_model.clone());
    let synthesizer = Synthesizer::new(prompts, args.llm, config.synthesis_model.clone());

    Orchestrator::new(
        args.metadata,
        args.graph,
        args.cache,
        planner,
        collector,
        cypher_gen,
        synthesizer,
        config,
    )
}

fn build_orchestrator(campaign: Campaign, planning_decision_json: &str) -> Orchestrator {
    build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector: Arc::new(SingleNoteVectorSearch),
        graph: Arc::new(EmptyGraph),
        llm: Arc::new(ScriptedLlm::new(planning_decision_json)),
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    })
}

#[tokio::test]
async fn search_notes_action_yields_a_grounded_text_answer() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "search_notes",
        "reasoning": "the question asks about recent campaign events",
        "parameters": {}
    });
    let orchestrator = build_orchestrator(campaign, &decision.to_string());

    let response = orchestrator
        .handle_query(campaign_id, "What happened at the eastern watchtower?")
        .await
        .unwrap();

    assert_eq!(response.response_type, ResponseType::Text);
    assert!(response.text_response.contains("watchtower"));
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.executed_actions, vec!["search_notes".to_string()]);
}

#[tokio::test]
async fn clarification_needed_short_circuits_before_retrieval() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "clarification_needed",
        "reasoning": "the question doesn't name a character, place, or event",
        "parameters": { "clarification_message": "Which character are you asking about?" }
    });
    let orchestrator = build_orchestrator(campaign, &decision.to_string());

    let response = orchestrator.handle_query(campaign_id, "What happened to them?").await.unwrap();

    assert_eq!(response.response_type, ResponseType::ClarificationNeeded);
    assert_eq!(response.text_response, "Which character are you asking about?");
    assert!(response.sources.is_empty());
}

#[tokio::test]
async fn an_unknown_planner_action_falls_back_to_search_notes() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "summon_a_dragon",
        "reasoning": "unrecognized",
        "parameters": {}
    });
    let orchestrator = build_orchestrator(campaign, &decision.to_string());

    let response = orchestrator.handle_query(campaign_id, "Tell me about the watchtower.").await.unwrap();

    assert_eq!(
        response.executed_actions,
        vec!["action_fallback:search_notes".to_string(), "search_notes".to_string()]
    );
}

#[tokio::test]
async fn unknown_campaign_id_is_rejected_before_any_collaborator_is_called() {
    let campaign = test_campaign();
    let orchestrator = build_orchestrator(campaign, "{}");

    let result = orchestrator.handle_query(Uuid::new_v4(), "Anything?").await;

    assert!(matches!(result, Err(orchestrator_core::errors::OrchestratorError::CampaignNotFound(_))));
}

#[tokio::test]
async fn a_blank_query_is_rejected_as_invalid() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let orchestrator = build_orchestrator(campaign, "{}");

    let result = orchestrator.handle_query(campaign_id, "   ").await;

    assert!(matches!(result, Err(orchestrator_core::errors::OrchestratorError::InvalidQuery(_))));
}

#[tokio::test]
async fn repeating_a_query_is_served_from_cache_without_re_planning() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "search_notes",
        "reasoning": "recent events",
        "parameters": {}
    });
    let llm_calls = Arc::new(AtomicUsize::new(0));
    let llm = Arc::new(ScriptedLlm {
        planning_decision_json: decision.to_string(),
        cypher_json: None,
        synthesis_text: None,
        calls: llm_calls.clone(),
    });
    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector: Arc::new(SingleNoteVectorSearch),
        graph: Arc::new(EmptyGraph),
        llm,
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let first = orchestrator.handle_query(campaign_id, "What happened?").await.unwrap();
    let calls_after_first = llm_calls.load(Ordering::SeqCst);
    let second = orchestrator.handle_query(campaign_id, "What happened?").await.unwrap();

    assert_eq!(first.text_response, second.text_response);
    assert_eq!(
        llm_calls.load(Ordering::SeqCst),
        calls_after_first,
        "a cache hit must not invoke the llm again"
    );
}

/// S2: an artifact query walks search → Cypher generation → validation →
/// graph execution → an assembled graph payload.
#[tokio::test]
async fn artifact_action_assembles_a_graph_payload_from_the_executed_cypher() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let artifact_id = Uuid::new_v4();
    let decision = serde_json::json!({
        "action": "search_artifacts_then_graph",
        "reasoning": "the question names an item",
        "parameters": { "expected_cypher_scope": "relationships" }
    });

    let node_a = serde_json::json!({
        "id": artifact_id.to_string(), "name": "Blade of Dawn", "type": "Artifact",
        "description": "a longsword", "campaign_uuid": campaign_id.to_string(), "note_ids": [],
    });
    let node_b = serde_json::json!({
        "id": Uuid::new_v4().to_string(), "name": "Adam", "type": "Character",
        "description": "", "campaign_uuid": campaign_id.to_string(), "note_ids": [],
    });
    let edge = serde_json::json!({
        "id": Uuid::new_v4().to_string(), "label": "WIELDED_BY", "description": "",
        "reasoning": "", "note_ids": [],
    });
    let mut columns = serde_json::Map::new();
    columns.insert("a".to_string(), node_a);
    columns.insert("r".to_string(), edge);
    columns.insert("b".to_string(), node_b);
    let graph = Arc::new(ScriptedGraph {
        rows: vec![GraphRow { columns }],
    });

    let vector = Arc::new(ScriptedVectorSearch {
        artifacts: vec![ArtifactHit {
            artifact_id,
            name: "Blade of Dawn".to_string(),
            artifact_type: "weapon".to_string(),
            score: 0.8,
        }],
        ..Default::default()
    });

    let llm = Arc::new(ScriptedLlm {
        planning_decision_json: decision.to_string(),
        cypher_json: Some(
            serde_json::json!({
                "reasoning": "one hop",
                "cypher_query": "MATCH (a {campaign_uuid: $campaignUuid})-[r]-(b) RETURN a, r, b"
            })
            .to_string(),
        ),
        synthesis_text: None,
        calls: Arc::new(AtomicUsize::new(0)),
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector,
        graph,
        llm,
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator.handle_query(campaign_id, "Who wields the Blade of Dawn?").await.unwrap();

    assert_eq!(response.response_type, ResponseType::TextAndGraph);
    let graph_data = response.graph_data.expect("graph payload present");
    assert_eq!(graph_data.nodes.len(), 2);
    assert_eq!(graph_data.edges.len(), 1);
    assert_eq!(response.executed_actions, vec!["search_artifacts_then_graph".to_string()]);
}

/// S3: the Cypher validator rejecting a generated query surfaces as an
/// in-band error response carrying the rejected query for debugging.
#[tokio::test]
async fn validator_rejected_cypher_surfaces_as_an_error_response_with_the_generated_query() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let artifact_id = Uuid::new_v4();
    let decision = serde_json::json!({
        "action": "search_artifacts_then_graph",
        "reasoning": "the question names an item",
        "parameters": { "expected_cypher_scope": "relationships" }
    });

    let unsafe_cypher = "MATCH (a) DETACH DELETE a RETURN a";
    let vector = Arc::new(ScriptedVectorSearch {
        artifacts: vec![ArtifactHit {
            artifact_id,
            name: "Blade of Dawn".to_string(),
            artifact_type: "weapon".to_string(),
            score: 0.8,
        }],
        ..Default::default()
    });
    let llm = Arc::new(ScriptedLlm {
        planning_decision_json: decision.to_string(),
        cypher_json: Some(
            serde_json::json!({ "reasoning": "bad", "cypher_query": unsafe_cypher }).to_string(),
        ),
        synthesis_text: None,
        calls: Arc::new(AtomicUsize::new(0)),
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector,
        graph: Arc::new(EmptyGraph),
        llm,
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator.handle_query(campaign_id, "Who wields the Blade of Dawn?").await.unwrap();

    assert_eq!(response.response_type, ResponseType::Error);
    assert_eq!(response.error_type.as_deref(), Some("invalid-cypher"));
    let debug_info = response.debug_info.expect("invalid cypher carries debug info");
    assert_eq!(debug_info["generatedCypher"], unsafe_cypher);
}

/// S4: `out_of_scope` short-circuits before any vector or graph
/// collaborator is ever called.
#[tokio::test]
async fn out_of_scope_action_makes_no_vector_or_graph_call() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "out_of_scope",
        "reasoning": "asks about real-world rules, not this campaign",
        "parameters": {}
    });
    let vector_calls = Arc::new(AtomicUsize::new(0));
    let graph_calls = Arc::new(AtomicUsize::new(0));

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector: Arc::new(CountingVectorSearch { calls: vector_calls.clone() }),
        graph: Arc::new(CountingGraph { calls: graph_calls.clone() }),
        llm: Arc::new(ScriptedLlm::new(&decision.to_string())),
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator
        .handle_query(campaign_id, "How many hit points does a level 5 fighter have?")
        .await
        .unwrap();

    assert_eq!(response.response_type, ResponseType::OutOfScope);
    assert_eq!(vector_calls.load(Ordering::SeqCst), 0);
    assert_eq!(graph_calls.load(Ordering::SeqCst), 0);
}

/// S6: clearing the cache for a campaign forces the next identical query
/// to re-plan (and re-invoke the LLM) rather than serving a stale answer.
#[tokio::test]
async fn invalidating_the_cache_forces_replanning_on_the_next_identical_query() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "search_notes",
        "reasoning": "recent events",
        "parameters": {}
    });
    let llm_calls = Arc::new(AtomicUsize::new(0));
    let llm = Arc::new(ScriptedLlm {
        planning_decision_json: decision.to_string(),
        cypher_json: None,
        synthesis_text: None,
        calls: llm_calls.clone(),
    });
    let cache = Arc::new(QueryResultCache::new(Duration::from_secs(300)));

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector: Arc::new(SingleNoteVectorSearch),
        graph: Arc::new(EmptyGraph),
        llm,
        cache: cache.clone(),
    });

    orchestrator.handle_query(campaign_id, "What happened?").await.unwrap();
    let calls_after_first = llm_calls.load(Ordering::SeqCst);

    orchestrator.handle_query(campaign_id, "What happened?").await.unwrap();
    assert_eq!(llm_calls.load(Ordering::SeqCst), calls_after_first, "a cache hit must not re-plan");

    cache.invalidate_all(campaign_id);
    orchestrator.handle_query(campaign_id, "What happened?").await.unwrap();
    assert!(
        llm_calls.load(Ordering::SeqCst) > calls_after_first,
        "invalidation must force the planner to run again"
    );
}

/// Testable Property 5: every `[Note: ...]` citation in a synthesized
/// answer names a note that actually appears in the response's sources.
#[tokio::test]
async fn every_citation_in_the_synthesized_answer_names_a_returned_source() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "search_notes",
        "reasoning": "recent events",
        "parameters": {}
    });
    let note_title = "The Siege of Brindlewood".to_string();
    let vector = Arc::new(ScriptedVectorSearch {
        notes: vec![NoteHit {
            note_id: Uuid::new_v4(),
            title: note_title.clone(),
            snippet: "Goblin warbands overran the eastern watchtower.".to_string(),
            score: 0.9,
        }],
        ..Default::default()
    });
    let llm = Arc::new(ScriptedLlm {
        planning_decision_json: decision.to_string(),
        cypher_json: None,
        synthesis_text: Some(format!("Goblins overran the watchtower [Note: {note_title}].")),
        calls: Arc::new(AtomicUsize::new(0)),
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector,
        graph: Arc::new(EmptyGraph),
        llm,
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator
        .handle_query(campaign_id, "What happened at the watchtower?")
        .await
        .unwrap();

    let citations = orchestrator::citations::extract_citations(&response.text_response);
    let source_titles: Vec<&str> = response.sources.iter().map(|s| s.note_title.as_str()).collect();

    assert!(!citations.is_empty());
    assert!(citations.iter().all(|c| source_titles.contains(&c.as_str())));
}

/// Testable Property 6: `combined_search` degrades gracefully when one of
/// the three fanned-out adapter calls fails, and only errors when every
/// one of them does.
#[tokio::test]
async fn combined_search_degrades_gracefully_when_one_adapter_call_fails() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "combined_search",
        "reasoning": "a broad question",
        "parameters": {}
    });
    let note_id = Uuid::new_v4();
    let vector = Arc::new(ScriptedVectorSearch {
        notes: vec![NoteHit {
            note_id,
            title: "Session 4".to_string(),
            snippet: "The party regrouped at the keep.".to_string(),
            score: 0.7,
        }],
        fail_artifacts: true,
        ..Default::default()
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector,
        graph: Arc::new(EmptyGraph),
        llm: Arc::new(ScriptedLlm::new(&decision.to_string())),
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator
        .handle_query(campaign_id, "Tell me everything about the siege.")
        .await
        .unwrap();

    assert_eq!(response.response_type, ResponseType::Text);
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].note_id, note_id);
}

#[tokio::test]
async fn combined_search_fails_only_when_every_adapter_call_fails() {
    let campaign = test_campaign();
    let campaign_id = campaign.id;
    let decision = serde_json::json!({
        "action": "combined_search",
        "reasoning": "a broad question",
        "parameters": {}
    });
    let vector = Arc::new(ScriptedVectorSearch {
        fail_notes: true,
        fail_artifacts: true,
        fail_relationships: true,
        ..Default::default()
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata: Arc::new(FixedMetadata { campaign }),
        vector,
        graph: Arc::new(EmptyGraph),
        llm: Arc::new(ScriptedLlm::new(&decision.to_string())),
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response = orchestrator.handle_query(campaign_id, "Tell me everything.").await.unwrap();

    assert_eq!(response.response_type, ResponseType::Error);
}

/// Testable Property 8: two campaigns served by the same orchestrator
/// never see each other's retrieval results.
#[tokio::test]
async fn two_campaigns_never_share_retrieval_results() {
    let campaign_a = test_campaign();
    let mut campaign_b = test_campaign();
    campaign_b.id = Uuid::new_v4();
    campaign_b.name = "The Ashfall Campaign".to_string();
    campaign_b.vector_collection = "ashfall".to_string();

    let decision = serde_json::json!({
        "action": "search_notes",
        "reasoning": "recent events",
        "parameters": {}
    });
    let metadata = Arc::new(MultiCampaignMetadata {
        campaigns: vec![campaign_a.clone(), campaign_b.clone()],
    });

    let orchestrator = build_orchestrator_full(OrchestratorArgs {
        metadata,
        vector: Arc::new(PerCampaignVectorSearch),
        graph: Arc::new(EmptyGraph),
        llm: Arc::new(ScriptedLlm::new(&decision.to_string())),
        cache: Arc::new(QueryResultCache::new(Duration::from_secs(300))),
    });

    let response_a = orchestrator.handle_query(campaign_a.id, "What happened?").await.unwrap();
    let response_b = orchestrator.handle_query(campaign_b.id, "What happened?").await.unwrap();

    assert_ne!(response_a.sources[0].note_id, response_b.sources[0].note_id);
    assert_ne!(response_a.sources[0].note_title, response_b.sources[0].note_title);
    assert!(response_a.sources[0].note_title.contains(&campaign_a.name));
    assert!(response_b.sources[0].note_title.contains(&campaign_b.name));
}

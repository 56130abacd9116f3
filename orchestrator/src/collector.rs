//! Data Collector (C7): invokes the vector search adapter per the
//! Planner's decision, fanning `combined_search` out concurrently with
//! `tokio::join!`. Ordering of the merged evidence is made deterministic
//! afterward with a plain sort, since fan-out completion order is not.

use orchestrator_core::errors::{OrchestratorError, VectorError};
use orchestrator_core::traits::VectorSearch;
use orchestrator_core::types::{Action, Campaign, EvidenceBundle, PlanningDecision};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{instrument, warn};

pub struct DataCollector {
    vector: Arc<dyn VectorSearch>,
}

impl DataCollector {
    pub fn new(vector: Arc<dyn VectorSearch>) -> Self {
        Self { vector }
    }

    #[instrument(
        name = "vector-search",
        skip(self, campaign, decision, query),
        fields(action = decision.action.as_wire_str())
    )]
    pub async fn collect(
        &self,
        campaign: &Campaign,
        decision: &PlanningDecision,
        query: &str,
        k_default: u8,
    ) -> Result<EvidenceBundle, OrchestratorError> {
        let mut bundle = match decision.action {
            Action::SearchNotes => {
                let mut notes = self
                    .vector
                    .search_notes(campaign, query, k_default)
                    .await
                    .map_err(OrchestratorError::Retrieval)?;
                sort_notes(&mut notes);
                EvidenceBundle {
                    candidate_notes: notes,
                    ..Default::default()
                }
            }
            Action::SearchArtifactsThenGraph => {
                let search_query = decision.artifact_search_query.as_deref().unwrap_or(query);
                let hits = self
                    .vector
                    .search_artifacts(campaign, search_query, k_default)
                    .await
                    .map_err(OrchestratorError::Retrieval)?;
                EvidenceBundle {
                    found_artifact: hits.into_iter().next(),
                    ..Default::default()
                }
            }
            Action::SearchRelationsThenGraph => {
                let search_query = decision.artifact_search_query.as_deref().unwrap_or(query);
                let hits = self
                    .vector
                    .search_relationships(campaign, search_query, k_default)
                    .await
                    .map_err(OrchestratorError::Retrieval)?;
                EvidenceBundle {
                    found_relationship: hits.into_iter().next(),
                    ..Default::default()
                }
            }
            Action::CombinedSearch => self.collect_combined(campaign, query, k_default).await?,
            Action::ClarificationNeeded | Action::OutOfScope => EvidenceBundle::default(),
        };

        sort_notes(&mut bundle.candidate_notes);
        Ok(bundle)
    }

    #[instrument(name = "vector-search-combined", skip(self, campaign, query))]
    async fn collect_combined(
        &self,
        campaign: &Campaign,
        query: &str,
        k_default: u8,
    ) -> Result<EvidenceBundle, OrchestratorError> {
        let (notes_res, artifacts_res, relations_res) = tokio::join!(
            self.vector.search_notes(campaign, query, k_default),
            self.vector.search_artifacts(campaign, query, k_default),
            self.vector.search_relationships(campaign, query, k_default),
        );

        let mut successes = 0u8;

        let candidate_notes = match notes_res {
            Ok(hits) => {
                successes += 1;
                hits
            }
            Err(e) => {
                warn!(error = %e, "note search failed during combined_search, degrading gracefully");
                Vec::new()
            }
        };

        let found_artifact = match artifacts_res {
            Ok(hits) => {
                successes += 1;
                hits.into_iter().next()
            }
            Err(e) => {
                warn!(error = %e, "artifact search failed during combined_search, degrading gracefully");
                None
            }
        };

        let found_relationship = match relations_res {
            Ok(hits) => {
                successes += 1;
                hits.into_iter().next()
            }
            Err(e) => {
                warn!(error = %e, "relationship search failed during combined_search, degrading gracefully");
                None
            }
        };

        if successes == 0 {
            return Err(OrchestratorError::Retrieval(VectorError::AllSourcesFailed));
        }

        Ok(EvidenceBundle {
            candidate_notes,
            found_artifact,
            found_relationship,
            graph_payload: None,
        })
    }
}

/// Deterministic (score desc, then note id) ordering, so that a bundle
/// assembled from concurrent calls doesn't vary with wall-clock arrival
/// order.
fn sort_notes(notes: &mut [orchestrator_core::types::NoteHit]) {
    notes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.note_id.cmp(&b.note_id))
    });
}

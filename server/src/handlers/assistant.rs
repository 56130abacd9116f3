//! The single assistant-query endpoint: `POST
//! /api/campaigns/:campaignUuid/assistant/query`. Input-validation failures
//! (`invalid-query`, `campaign-not-found`) become 4xx; every other domain
//! failure is already converted to an in-band `AssistantResponse` with
//! `responseType: "error"` by the orchestrator, and returned as 200.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use orchestrator_core::errors::OrchestratorError;
use orchestrator_core::types::AssistantResponse;
use uuid::Uuid;

use crate::models::QueryRequest;
use crate::AppState;

pub async fn handle_query(
    State(state): State<AppState>,
    Path(campaign_uuid): Path<Uuid>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AssistantResponse>, (StatusCode, String)> {
    state
        .orchestrator
        .handle_query(campaign_uuid, &request.query)
        .await
        .map(Json)
        .map_err(|err| match err {
            OrchestratorError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            OrchestratorError::CampaignNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("campaign not found: {id}"))
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })
}

/// Administrative cache invalidation: evicts every cached query result for
/// a campaign. Ingestion's commit path invalidates synchronously already;
/// this exists for operators and tests that need to force it out-of-band.
pub async fn clear_cache(State(state): State<AppState>, Path(campaign_uuid): Path<Uuid>) -> StatusCode {
    state.cache.invalidate_all(campaign_uuid);
    StatusCode::NO_CONTENT
}

//! Request/response DTOs that aren't already defined on
//! `orchestrator_core::types` (which `AssistantResponse` is returned from
//! directly, unwrapped, per the wire contract).

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

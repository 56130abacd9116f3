//! Core types, traits, and error taxonomy for the assistant orchestrator.
//!
//! This crate carries no I/O of its own: adapters and connectors implement
//! the traits defined here against concrete backends, and the orchestrator
//! crate composes them into the query pipeline.

pub mod cache;
pub mod config;
pub mod cypher_validator;
pub mod errors;
pub mod traits;
pub mod types;

pub use config::OrchestratorConfig;
pub use errors::{ErrorKind, OrchestratorError, OrchestratorResult};
pub use types::{Action, AssistantResponse, Campaign, EvidenceBundle, PlanningDecision};

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::cache::QueryResultCache;
    pub use crate::config::OrchestratorConfig;
    pub use crate::errors::*;
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}

//! Error taxonomy for the assistant orchestrator.
//!
//! One enum per failure domain, aggregated into [`OrchestratorError`] the way
//! `CoreError` aggregates `GraphError`/`LlmError`/`PipelineError` in the
//! system this workspace descends from. [`ErrorKind`] is the wire/trace-level
//! projection used by the HTTP layer and by observability attributes.

use thiserror::Error;

/// Top-level error type for one request's pipeline.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("campaign not found: {0}")]
    CampaignNotFound(uuid::Uuid),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("planning failed: {0}")]
    Planning(#[from] PlanningError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] VectorError),

    #[error("invalid cypher generated: {query}")]
    InvalidCypher {
        query: String,
        #[source]
        reason: ValidationError,
    },

    #[error("graph execution failed: {0}")]
    Graph(#[from] GraphError),

    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("prompt registry error: {0}")]
    Prompt(#[from] PromptError),

    #[error("per-request budget exhausted")]
    OverallTimeout,
}

impl OrchestratorError {
    /// The stable wire/trace kind, per the error taxonomy table.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::CampaignNotFound(_) => ErrorKind::CampaignNotFound,
            OrchestratorError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            OrchestratorError::Planning(_) => ErrorKind::PlanningFailure,
            OrchestratorError::Retrieval(_) => ErrorKind::RetrievalFailure,
            OrchestratorError::InvalidCypher { .. } => ErrorKind::InvalidCypher,
            OrchestratorError::Graph(GraphError::Timeout(_)) => ErrorKind::GraphTimeout,
            OrchestratorError::Graph(_) => ErrorKind::GraphExecutionFailed,
            OrchestratorError::Llm(LlmError::Timeout) => ErrorKind::LlmTimeout,
            OrchestratorError::Llm(_) => ErrorKind::PlanningFailure,
            OrchestratorError::Synthesis(_) => ErrorKind::SynthesisFailure,
            OrchestratorError::Prompt(_) => ErrorKind::PlanningFailure,
            OrchestratorError::OverallTimeout => ErrorKind::OverallTimeout,
        }
    }
}

/// The stable error-kind vocabulary surfaced in `errorType` and in trace
/// attributes. Kept separate from `OrchestratorError` so the wire contract
/// doesn't shift if the error enum's variants are refactored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CampaignNotFound,
    InvalidQuery,
    PlanningFailure,
    RetrievalFailure,
    InvalidCypher,
    GraphExecutionFailed,
    GraphTimeout,
    LlmTimeout,
    SynthesisFailure,
    OverallTimeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::CampaignNotFound => "campaign-not-found",
            ErrorKind::InvalidQuery => "invalid-query",
            ErrorKind::PlanningFailure => "planning-failure",
            ErrorKind::RetrievalFailure => "retrieval-failure",
            ErrorKind::InvalidCypher => "invalid-cypher",
            ErrorKind::GraphExecutionFailed => "graph-execution-failed",
            ErrorKind::GraphTimeout => "graph-timeout",
            ErrorKind::LlmTimeout => "llm-timeout",
            ErrorKind::SynthesisFailure => "synthesis-failure",
            ErrorKind::OverallTimeout => "overall-timeout",
        };
        f.write_str(s)
    }
}

/// Errors from the Cypher validator (C1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("label is not safe for use in a graph query: {0}")]
    UnsafeLabel(String),

    #[error("query contains a forbidden token: {0}")]
    ForbiddenToken(String),

    #[error("query is missing a MATCH clause")]
    MissingMatch,

    #[error("query must have exactly one top-level RETURN, found {0}")]
    WrongReturnCount(usize),

    #[error("query does not reference $campaignUuid")]
    MissingCampaignParameter,

    #[error("CALL procedure `{0}` is not in the read-only allowlist")]
    DisallowedProcedure(String),
}

/// Errors from the graph query adapter (C3).
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("connection to graph store failed: {0}")]
    ConnectionFailed(String),

    #[error("query execution failed: {0}")]
    QueryFailed(String),

    #[error("graph store timed out: {0}")]
    Timeout(String),

    #[error("driver refused a write on the read-only session: {0}")]
    WriteRejected(String),
}

/// Errors from the vector search adapter (C2) and its embedding
/// collaborator.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("embedding service returned {actual} dims, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding service failed: {0}")]
    EmbeddingFailed(String),

    #[error("vector store search failed: {0}")]
    SearchFailed(String),

    #[error("vector store timed out: {0}")]
    Timeout(String),

    #[error("all vector adapter calls failed for this request")]
    AllSourcesFailed,
}

/// Errors from the LLM client (C5).
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("llm configuration error: {0}")]
    ConfigError(String),

    #[error("network error calling llm provider: {0}")]
    NetworkError(String),

    #[error("llm provider returned an error: {0}")]
    ApiError(String),

    #[error("llm call timed out")]
    Timeout,

    #[error("failed to parse llm response: {0}")]
    ResponseParseError(String),
}

/// Errors from the prompt registry client (C4).
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt `{name}` (label/version `{label}`) not found after retries")]
    Missing { name: String, label: String },

    #[error("prompt registry request failed: {0}")]
    RequestFailed(String),
}

/// Errors from the planner (C6) and Cypher generator (C8) — decision/JSON
/// parsing failures distinct from the underlying LLM/vector failures.
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("decision json could not be parsed: {0}")]
    MalformedDecision(String),
}

/// Errors from the query result cache (C10).
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

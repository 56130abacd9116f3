//! The CLI's own error type. `orchestrator_core::errors::OrchestratorError`
//! models one request's pipeline failures; operator-CLI concerns
//! (configuration, transport, response parsing) are distinct enough to
//! warrant their own small taxonomy, the way `kgctl`'s presentation-layer
//! errors were kept separate from the core graph engine's.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}

//! Crate-wide error taxonomy shared by the whole pipeline.
//!
//! Every component-level error enum (`SourceControlError`, `DispatchError`, ...)
//! converts into this root via `#[from]`, the same layering `mr-reviewer` uses
//! for its own `Error`/`ProviderError` pair.

use thiserror::Error;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Surface-level error kinds every provider/store error is mapped into.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication error")]
    Authentication,

    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(e: serde_json::Error) -> Self {
        OrchestratorError::Encoding(e.to_string())
    }
}

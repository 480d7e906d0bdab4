use thiserror::Error;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Core(#[from] orchestrator_core::OrchestratorError),

    #[error("malformed result blob at {0}")]
    MalformedResult(String),
}

impl From<ReconcileError> for orchestrator_core::OrchestratorError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Core(inner) => inner,
            ReconcileError::MalformedResult(key) => orchestrator_core::OrchestratorError::Encoding(key),
        }
    }
}

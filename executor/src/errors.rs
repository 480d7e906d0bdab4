use thiserror::Error;

pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Decode(#[from] dispatcher::DispatchError),

    #[error(transparent)]
    Llm(#[from] llm_client::LlmError),

    #[error(transparent)]
    Core(#[from] orchestrator_core::OrchestratorError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("task {0} exhausted its retry budget")]
    RetryExhausted(String),
}

use thiserror::Error;

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    SourceControl(#[from] source_control::Error),

    #[error(transparent)]
    Core(#[from] orchestrator_core::OrchestratorError),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<DispatchError> for orchestrator_core::OrchestratorError {
    fn from(e: DispatchError) -> Self {
        use orchestrator_core::OrchestratorError as O;
        match e {
            DispatchError::Validation(m) => O::Validation(m),
            DispatchError::SourceControl(sc) => sc.into(),
            DispatchError::Core(c) => c,
            DispatchError::Encoding(m) => O::Encoding(m),
        }
    }
}

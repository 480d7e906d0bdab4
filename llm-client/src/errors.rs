//! Error type for the LLM-invocation transport.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("invalid response shape: no content returned")]
    EmptyContent,
}

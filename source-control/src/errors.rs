//! Error hierarchy for the source-control adapter.
//!
//! Mirrors the layering used elsewhere in this workspace: a single root
//! `Error` wrapping provider-facing failures, with `From` conversions for
//! ergonomic `?` use and explicit HTTP-status-code mapping.

use thiserror::Error;

pub type ScResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
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

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("server error: status {0}")]
    Server(u16),

    #[error("http status error: {0}")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                429 => ProviderError::RateLimited,
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus(code),
            };
        }
        ProviderError::Network(e.to_string())
    }
}

impl From<Error> for orchestrator_core::OrchestratorError {
    fn from(e: Error) -> Self {
        use orchestrator_core::OrchestratorError as O;
        match e {
            Error::Validation(m) => O::Validation(m),
            Error::Authentication => O::Authentication,
            Error::Forbidden => O::Forbidden,
            Error::NotFound(m) => O::NotFound(m),
            Error::Encoding(m) => O::Encoding(m),
            Error::Provider(ProviderError::Unauthorized) => O::Authentication,
            Error::Provider(ProviderError::Forbidden) => O::Forbidden,
            Error::Provider(ProviderError::NotFound) => O::NotFound("provider resource".into()),
            Error::Provider(other) => O::Unknown(other.to_string()),
        }
    }
}

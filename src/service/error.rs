use thiserror::Error;

use crate::error::ConfigError;
use crate::model::ValidationError;
use crate::repository::RepositoryError;

/// Failure of a service call. A cache miss is never one of these.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("exchange rate unavailable: {0}")]
    ExchangeRate(String),

    #[error("cache configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.0)
    }
}

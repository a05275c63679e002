//! Error types for API contract validation

use thiserror::Error;

/// Errors raised when a request violates the API contract locally
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type ApiContractResult<T> = Result<T, ApiContractError>;

//! Error types for the REST API client

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    /// The service did not accept the API key, at connect time or later.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// The service could not be reached (DNS, refused connection, timeout).
    #[error("Connection to service failed: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Workflow file {} could not be read: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Workflow file {} is not valid JSON: {source}", .path.display())]
    InvalidWorkflowFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The service answered with a payload of the wrong shape.
    #[error("Unexpected response format: {0}")]
    InvalidResponse(String),

    #[error("Server returned error status {status}: {message}")]
    Service { status: StatusCode, message: String },

    #[error("API contract error: {0}")]
    ApiContract(#[from] waveflow_api_contract::ApiContractError),

    #[error("HTTP client could not be created: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

//! Client API trait for WaveFlow Studio
//!
//! Application code depends on [`WorkflowApi`] so it can run against the
//! REST client in production and the mock client in tests.

use async_trait::async_trait;
use thiserror::Error;
use waveflow_api_contract::*;

#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

impl From<ApiContractError> for ClientApiError {
    fn from(err: ApiContractError) -> Self {
        ClientApiError::InvalidInput(err.to_string())
    }
}

#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
    ) -> ClientApiResult<WorkflowCreation>;

    async fn chat(
        &self,
        workflow_id: &WorkflowId,
        request: &ChatRequest,
    ) -> ClientApiResult<ChatResponse>;

    async fn session_history(&self, workflow_id: &WorkflowId) -> ClientApiResult<SessionHistory>;

    async fn list_workflows(&self) -> ClientApiResult<WorkflowList>;
}

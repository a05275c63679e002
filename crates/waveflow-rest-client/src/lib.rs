//! REST API client for the WaveFlow Studio service
//!
//! This crate provides the HTTP client for the WaveFlow Studio workflow API:
//! API key validation on connect, workflow creation from JSON definitions,
//! and chat against created workflows.
//!
//! ```no_run
//! # async fn run() -> waveflow_rest_client::RestClientResult<()> {
//! use waveflow_rest_client::{ClientConfig, RestClient, WorkflowCreation};
//!
//! let client = RestClient::connect(
//!     ClientConfig::new("AAAI-WFS-...").with_base_url("http://127.0.0.1:5000"),
//! )
//! .await?;
//!
//! if let WorkflowCreation::Created { workflow_id } =
//!     client.create_workflow("workflow.json").await?
//! {
//!     let reply = client
//!         .workflow(workflow_id)
//!         .chat("Hello, how can you help me?", None)
//!         .await?;
//!     println!("{}", reply.answer);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;

pub use waveflow_api_contract::{
    ChatRequest, ChatResponse, SessionHistory, WorkflowCreation, WorkflowDefinition, WorkflowId,
    WorkflowList, WorkflowMatches,
};

use async_trait::async_trait;
use waveflow_client_api::{ClientApiError, ClientApiResult, WorkflowApi};

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        let message = err.to_string();
        match err {
            RestClientError::InvalidApiKey(reason) => ClientApiError::InvalidApiKey(reason),
            RestClientError::Connection(_) => ClientApiError::Connection(message),
            RestClientError::InvalidResponse(reason) => ClientApiError::InvalidResponse(reason),
            RestClientError::ApiContract(_) => ClientApiError::InvalidInput(message),
            RestClientError::Service { .. } => ClientApiError::Server(message),
            _ => ClientApiError::Unexpected(message),
        }
    }
}

#[async_trait]
impl WorkflowApi for client::RestClient {
    async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
    ) -> ClientApiResult<WorkflowCreation> {
        Ok(self.create_workflow_from_definition(definition).await?)
    }

    async fn chat(
        &self,
        workflow_id: &WorkflowId,
        request: &ChatRequest,
    ) -> ClientApiResult<ChatResponse> {
        Ok(self.chat(workflow_id, request).await?)
    }

    async fn session_history(&self, workflow_id: &WorkflowId) -> ClientApiResult<SessionHistory> {
        Ok(self.session_history(workflow_id).await?)
    }

    async fn list_workflows(&self) -> ClientApiResult<WorkflowList> {
        Ok(self.list_workflows().await?)
    }
}

//! Mock WaveFlow Studio client backed by in-memory workflows

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;
use waveflow_api_contract::*;
use waveflow_client_api::{ClientApiError, ClientApiResult, WorkflowApi};

const DEFAULT_ANSWER: &str = "This is a mock answer.";

/// In-memory stand-in for the WaveFlow Studio service
///
/// Every created workflow gets a fresh id, so identical definitions create
/// distinct workflows. Chats append to the workflow's transcript, which is
/// what `conversation` and `session_history` return.
pub struct MockClient {
    answer: String,
    workflows: Mutex<HashMap<WorkflowId, Vec<Value>>>,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            answer: DEFAULT_ANSWER.to_string(),
            workflows: Mutex::new(HashMap::new()),
        }
    }

    /// Answer every chat with `answer`
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    pub fn workflow_count(&self) -> usize {
        self.workflows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn workflows(&self) -> ClientApiResult<MutexGuard<'_, HashMap<WorkflowId, Vec<Value>>>> {
        self.workflows
            .lock()
            .map_err(|_| ClientApiError::Unexpected("mock state poisoned".into()))
    }
}

fn not_found(workflow_id: &WorkflowId) -> ClientApiError {
    ClientApiError::Server(format!("workflow {workflow_id} not found"))
}

#[async_trait]
impl WorkflowApi for MockClient {
    async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
    ) -> ClientApiResult<WorkflowCreation> {
        if !definition.as_value().is_object() {
            return Ok(WorkflowCreation::Rejected {
                error: "agents_data must be a JSON object".into(),
            });
        }

        let workflow_id = WorkflowId::new(Uuid::new_v4().to_string());
        self.workflows()?.insert(workflow_id.clone(), Vec::new());
        debug!(%workflow_id, "mock workflow created");
        Ok(WorkflowCreation::Created { workflow_id })
    }

    async fn chat(
        &self,
        workflow_id: &WorkflowId,
        request: &ChatRequest,
    ) -> ClientApiResult<ChatResponse> {
        validate_request(request)?;

        let mut workflows = self.workflows()?;
        let transcript = workflows
            .get_mut(workflow_id)
            .ok_or_else(|| not_found(workflow_id))?;
        transcript.push(json!({ "role": "user", "content": request.query }));
        transcript.push(json!({ "role": "assistant", "content": self.answer }));

        Ok(ChatResponse {
            answer: self.answer.clone(),
            conversation: Value::Array(transcript.clone()),
            citation: request.context.as_ref().map(|context| json!([context])),
        })
    }

    async fn session_history(&self, workflow_id: &WorkflowId) -> ClientApiResult<SessionHistory> {
        let workflows = self.workflows()?;
        let transcript = workflows.get(workflow_id).ok_or_else(|| not_found(workflow_id))?;
        Ok(SessionHistory::new(json!({
            "session_id": workflow_id,
            "history": transcript,
        })))
    }

    async fn list_workflows(&self) -> ClientApiResult<WorkflowList> {
        let workflows = self.workflows()?;
        let mut ids: Vec<&WorkflowId> = workflows.keys().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        Ok(WorkflowList {
            templates: ids
                .into_iter()
                .map(|id| json!({ "workflow_id": id }))
                .collect(),
            workflows_count: workflows.len() as u64,
        })
    }
}

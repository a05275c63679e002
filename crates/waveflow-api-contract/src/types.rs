//! API contract types for the WaveFlow Studio REST service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use validator::Validate;

/// Identifier of a workflow created on the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WorkflowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for WorkflowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A workflow definition as authored in the studio.
///
/// The structure belongs to the service; the SDK only carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDefinition(Value);

impl WorkflowDefinition {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a definition from JSON text. Only JSON syntax is checked.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Parse a definition from raw file bytes. Invalid UTF-8 is a JSON error.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Error fields the service uses on failure responses
///
/// FastAPI handlers report `detail`, older handlers `error` or `message`.
/// `detail` may be a list of validation problems rather than a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ServiceErrorBody {
    /// The first of `detail`, `error` and `message` carrying something readable
    pub fn message(&self) -> Option<String> {
        [&self.detail, &self.error, &self.message]
            .into_iter()
            .flatten()
            .find_map(describe)
    }
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Response of `GET /user`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyValidationResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub error: ServiceErrorBody,
}

impl KeyValidationResponse {
    /// Whether the key resolved to a user
    pub fn is_valid(&self) -> bool {
        self.status_code == Some(200)
            && self
                .content
                .as_ref()
                .and_then(|content| content.get("valid"))
                .map(is_truthy)
                .unwrap_or(false)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Body of `POST /workflow-config`
#[derive(Debug, Clone, Serialize)]
pub struct CreateWorkflowRequest<'a> {
    pub agents_data: &'a WorkflowDefinition,
}

/// Raw response of `POST /workflow-config`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowConfigResponse {
    #[serde(default, deserialize_with = "lenient_workflow_id")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(flatten)]
    pub error: ServiceErrorBody,
}

impl WorkflowConfigResponse {
    /// Map the response onto its outcome, or `None` when it carries neither
    /// a workflow id nor an error.
    pub fn into_creation(self) -> Option<WorkflowCreation> {
        if let Some(workflow_id) = self.workflow_id {
            return Some(WorkflowCreation::Created { workflow_id });
        }
        self.error
            .message()
            .map(|error| WorkflowCreation::Rejected { error })
    }
}

// Workflow ids have been observed both as strings and as integers.
fn lenient_workflow_id<'de, D>(deserializer: D) -> Result<Option<WorkflowId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) if !id.is_empty() => Some(WorkflowId(id)),
        Some(Value::Number(id)) => Some(WorkflowId(id.to_string())),
        _ => None,
    })
}

/// Outcome of a workflow creation request.
///
/// A rejection (for example a malformed workflow) is the service's answer,
/// not a transport failure, so it is returned as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowCreation {
    Created { workflow_id: WorkflowId },
    Rejected { error: String },
}

impl WorkflowCreation {
    pub fn workflow_id(&self) -> Option<&WorkflowId> {
        match self {
            WorkflowCreation::Created { workflow_id } => Some(workflow_id),
            WorkflowCreation::Rejected { .. } => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, WorkflowCreation::Created { .. })
    }
}

/// A chat query against a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: None,
        }
    }

    /// Attach side information for the workflow
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Body of `POST /workflow-run-chat-pdf-sdk`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRunRequest<'a> {
    pub workflow_id: &'a WorkflowId,
    pub query: &'a str,
    pub context: &'a str,
}

impl<'a> ChatRunRequest<'a> {
    pub fn new(workflow_id: &'a WorkflowId, request: &'a ChatRequest) -> Self {
        Self {
            workflow_id,
            query: &request.query,
            context: request.context.as_deref().unwrap_or(""),
        }
    }
}

/// Raw response of `POST /workflow-run-chat-pdf-sdk`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRunResponse {
    #[serde(default)]
    pub final_answer: Option<String>,
    #[serde(default)]
    pub conversation: Value,
    #[serde(default)]
    pub citation: Option<Value>,
}

impl ChatRunResponse {
    /// `None` when the service produced no answer
    pub fn into_chat_response(self) -> Option<ChatResponse> {
        let answer = self.final_answer?;
        Some(ChatResponse {
            answer,
            conversation: self.conversation,
            citation: self.citation,
        })
    }
}

/// Reply to a chat query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Transcript as produced by the service
    #[serde(default)]
    pub conversation: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Value>,
}

/// Body of `POST /get-session-history`
#[derive(Debug, Clone, Serialize)]
pub struct SessionHistoryRequest<'a> {
    pub session_id: &'a WorkflowId,
}

/// Chat history of a workflow session, as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHistory(Value);

impl SessionHistory {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Response of `GET /get_workflows`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowList {
    #[serde(default)]
    pub templates: Vec<Value>,
    #[serde(default)]
    pub workflows_count: u64,
}

/// Response of the `workflows_by_model` and `workflows_by_tool` lookups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMatches {
    #[serde(default)]
    pub workflows: Vec<Value>,
}

/// Query of `GET /workflows_by_model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WorkflowsByModelQuery {
    #[validate(length(min = 1, message = "model_id is required"))]
    pub model_id: String,
}

impl WorkflowsByModelQuery {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

/// Query of `GET /workflows_by_tool`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WorkflowsByToolQuery {
    #[validate(length(min = 1, message = "tool_id is required"))]
    pub tool_id: String,
}

impl WorkflowsByToolQuery {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
        }
    }
}

//! Main REST API client implementation

use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;
use waveflow_api_contract::*;

use crate::auth::AuthConfig;
use crate::config::ClientConfig;
use crate::error::{RestClientError, RestClientResult};

const INVALID_KEY_MESSAGE: &str = "Invalid API key provided.";

/// REST API client for the WaveFlow Studio service
///
/// A client only exists once the service has accepted its API key. The
/// configuration is fixed at construction, so one instance can serve
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl RestClient {
    /// Create a client and validate its API key against the service
    pub async fn connect(config: ClientConfig) -> RestClientResult<Self> {
        let client = Self::build(config)?;
        client.validate_api_key().await?;
        Ok(client)
    }

    /// Connect to the public service origin with the given API key
    pub async fn with_api_key(api_key: impl Into<String>) -> RestClientResult<Self> {
        Self::connect(ClientConfig::new(api_key.into())).await
    }

    fn build(config: ClientConfig) -> RestClientResult<Self> {
        let base_url = config.parsed_base_url()?;
        let auth = AuthConfig::with_api_key(config.api_key);

        let mut builder = HttpClient::builder()
            .user_agent(config.user_agent)
            .default_headers(auth.headers()?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(RestClientError::HttpClient)?;

        Ok(Self {
            http_client,
            base_url,
            auth,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the authentication config
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Bind a workflow id for repeated chats
    pub fn workflow(&self, workflow_id: impl Into<WorkflowId>) -> Workflow<'_> {
        Workflow {
            client: self,
            id: workflow_id.into(),
        }
    }

    /// Check the API key with `GET /user`
    pub async fn validate_api_key(&self) -> RestClientResult<()> {
        let url = self.endpoint("user")?;
        debug!(%url, "validating API key");
        let (status, text) = self.exchange(self.http_client.get(url)).await?;

        let body: KeyValidationResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(service_error(status, &text)),
            Err(e) => {
                return Err(RestClientError::InvalidResponse(format!(
                    "key validation response is not valid JSON: {e}"
                )))
            }
        };

        if body.is_valid() {
            debug!("API key accepted");
            return Ok(());
        }

        match body.status_code {
            Some(200) => {
                warn!("API key is not associated with any user");
                Err(RestClientError::InvalidApiKey(
                    "API key not associated with any user.".to_string(),
                ))
            }
            Some(401) | Some(403) => {
                warn!("API key rejected by service");
                Err(RestClientError::InvalidApiKey(
                    body.error
                        .message()
                        .unwrap_or_else(|| INVALID_KEY_MESSAGE.to_string()),
                ))
            }
            Some(code) => Err(RestClientError::Service {
                status: StatusCode::from_u16(code).unwrap_or(status),
                message: body
                    .error
                    .message()
                    .unwrap_or_else(|| "key validation failed".to_string()),
            }),
            None if !status.is_success() => Err(service_error(status, &text)),
            None => Err(RestClientError::InvalidResponse(
                "key validation response carries no status_code".to_string(),
            )),
        }
    }

    /// Create a workflow from a JSON definition file
    ///
    /// Nothing is sent when the file is missing or is not JSON. A rejection by
    /// the service is returned as [`WorkflowCreation::Rejected`].
    pub async fn create_workflow(
        &self,
        path: impl AsRef<Path>,
    ) -> RestClientResult<WorkflowCreation> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            RestClientError::FileNotFound {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let definition = WorkflowDefinition::from_json_slice(&bytes).map_err(|source| {
            RestClientError::InvalidWorkflowFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "loaded workflow definition");

        self.create_workflow_from_definition(&definition).await
    }

    /// Create a workflow from an in-memory definition
    pub async fn create_workflow_from_definition(
        &self,
        definition: &WorkflowDefinition,
    ) -> RestClientResult<WorkflowCreation> {
        let url = self.endpoint("workflow-config")?;
        debug!(%url, "uploading workflow definition");
        let body = CreateWorkflowRequest {
            agents_data: definition,
        };
        let (status, text) = self.exchange(self.http_client.post(url).json(&body)).await?;

        let response: WorkflowConfigResponse = serde_json::from_str(&text).map_err(|e| {
            RestClientError::InvalidResponse(format!(
                "workflow creation response (HTTP {status}) is not valid JSON: {e}"
            ))
        })?;

        match response.into_creation() {
            Some(WorkflowCreation::Created { workflow_id }) => {
                info!(%workflow_id, "workflow created");
                Ok(WorkflowCreation::Created { workflow_id })
            }
            Some(WorkflowCreation::Rejected { error }) => {
                warn!(%status, %error, "workflow rejected by service");
                Ok(WorkflowCreation::Rejected { error })
            }
            None => Err(RestClientError::InvalidResponse(format!(
                "workflow creation response (HTTP {status}) carries neither workflow_id nor error"
            ))),
        }
    }

    /// Send a chat query to a workflow
    pub async fn chat(
        &self,
        workflow_id: &WorkflowId,
        request: &ChatRequest,
    ) -> RestClientResult<ChatResponse> {
        validate_request(request)?;

        let url = self.endpoint("workflow-run-chat-pdf-sdk")?;
        debug!(%url, %workflow_id, "sending chat query");
        let body = ChatRunRequest::new(workflow_id, request);
        let (status, text) = self.exchange(self.http_client.post(url).json(&body)).await?;

        let response: ChatRunResponse = decode(status, &text)?;
        response.into_chat_response().ok_or_else(|| {
            RestClientError::InvalidResponse("chat response carries no final_answer".to_string())
        })
    }

    /// Fetch the chat history of a workflow session
    pub async fn session_history(
        &self,
        workflow_id: &WorkflowId,
    ) -> RestClientResult<SessionHistory> {
        let url = self.endpoint("get-session-history")?;
        let body = SessionHistoryRequest {
            session_id: workflow_id,
        };
        let (status, text) = self.exchange(self.http_client.post(url).json(&body)).await?;
        decode(status, &text)
    }

    /// List the workflows saved by the key's user
    pub async fn list_workflows(&self) -> RestClientResult<WorkflowList> {
        self.get("get_workflows").await
    }

    /// Find workflows that use a model
    pub async fn workflows_by_model(&self, model_id: &str) -> RestClientResult<WorkflowMatches> {
        let query = WorkflowsByModelQuery::new(model_id);
        validate_request(&query)?;
        self.get_with_query("workflows_by_model", &query).await
    }

    /// Find workflows that use a tool
    pub async fn workflows_by_tool(&self, tool_id: &str) -> RestClientResult<WorkflowMatches> {
        let query = WorkflowsByToolQuery::new(tool_id);
        validate_request(&query)?;
        self.get_with_query("workflows_by_tool", &query).await
    }

    // Private helper methods

    fn endpoint(&self, path: &str) -> RestClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> RestClientResult<T> {
        let url = self.endpoint(path)?;
        let (status, text) = self.exchange(self.http_client.get(url)).await?;
        decode(status, &text)
    }

    async fn get_with_query<T: DeserializeOwned, Q: serde::Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> RestClientResult<T> {
        let url = self.endpoint(path)?;
        let (status, text) = self
            .exchange(self.http_client.get(url).query(query))
            .await?;
        decode(status, &text)
    }

    /// Send one request and read its body. Authentication failures are
    /// mapped here so every endpoint reports them the same way.
    async fn exchange(&self, request: RequestBuilder) -> RestClientResult<(StatusCode, String)> {
        let response = request.send().await.map_err(RestClientError::Connection)?;
        let status = response.status();
        let text = response.text().await.map_err(RestClientError::Connection)?;
        debug!(%status, bytes = text.len(), "response received");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "API key rejected by service");
            return Err(auth_error(&text));
        }
        Ok((status, text))
    }
}

/// A workflow bound to a client
#[derive(Debug, Clone)]
pub struct Workflow<'a> {
    client: &'a RestClient,
    id: WorkflowId,
}

impl Workflow<'_> {
    pub fn id(&self) -> &WorkflowId {
        &self.id
    }

    /// Send a chat query, with optional side information
    pub async fn chat(
        &self,
        query: &str,
        context: Option<&str>,
    ) -> RestClientResult<ChatResponse> {
        let mut request = ChatRequest::new(query);
        if let Some(context) = context {
            request = request.with_context(context);
        }
        self.client.chat(&self.id, &request).await
    }

    pub async fn history(&self) -> RestClientResult<SessionHistory> {
        self.client.session_history(&self.id).await
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, text: &str) -> RestClientResult<T> {
    if !status.is_success() {
        return Err(service_error(status, text));
    }
    serde_json::from_str(text).map_err(|e| RestClientError::InvalidResponse(e.to_string()))
}

fn auth_error(text: &str) -> RestClientError {
    let message = serde_json::from_str::<ServiceErrorBody>(text)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| INVALID_KEY_MESSAGE.to_string());
    RestClientError::InvalidApiKey(message)
}

fn service_error(status: StatusCode, text: &str) -> RestClientError {
    let message = serde_json::from_str::<ServiceErrorBody>(text)
        .ok()
        .and_then(|body| body.message())
        .or_else(|| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown API error")
                .to_string()
        });
    RestClientError::Service { status, message }
}

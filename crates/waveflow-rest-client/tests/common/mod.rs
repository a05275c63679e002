//! Stub WaveFlow Studio service for client integration tests
//!
//! Each test spawns its own service on a random local port. It implements
//! just enough of the real endpoints to exercise the client, counts every
//! request it receives, and records request bodies for inspection.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use waveflow_rest_client::ClientConfig;

/// Key the stub accepts
pub const VALID_KEY: &str = "AAAI-WFS-8c8d194b-valid";
/// Key the stub recognizes but that belongs to no user
pub const UNASSOCIATED_KEY: &str = "AAAI-WFS-orphan";

pub struct ServiceState {
    keys: Mutex<HashSet<String>>,
    requests: AtomicUsize,
    next_workflow: AtomicU64,
    uploads: Mutex<Vec<Value>>,
    chats: Mutex<Vec<Value>>,
    workflow_reply: Mutex<Option<(StatusCode, String)>>,
    chat_reply: Mutex<Option<(StatusCode, String)>>,
}

impl ServiceState {
    fn new() -> Self {
        Self {
            keys: Mutex::new(HashSet::from([VALID_KEY.to_string()])),
            requests: AtomicUsize::new(0),
            next_workflow: AtomicU64::new(123),
            uploads: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
            workflow_reply: Mutex::new(None),
            chat_reply: Mutex::new(None),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        bearer(headers)
            .map(|key| self.keys.lock().unwrap().contains(&key))
            .unwrap_or(false)
    }
}

/// Test service instance; shuts down when dropped
pub struct TestService {
    pub base_url: String,
    state: Arc<ServiceState>,
    _shutdown_tx: oneshot::Sender<()>,
}

impl TestService {
    pub async fn spawn() -> Self {
        init_tracing();

        let state = Arc::new(ServiceState::new());
        let app = Router::new()
            .route("/user", get(user))
            .route("/workflow-config", post(workflow_config))
            .route("/workflow-run-chat-pdf-sdk", post(chat))
            .route("/get-session-history", post(session_history))
            .route("/get_workflows", get(list_workflows))
            .route("/workflows_by_model", get(workflows_by_model))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub service");
        let addr = listener.local_addr().expect("Failed to read local address");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Stub service failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn config(&self, api_key: &str) -> ClientConfig {
        ClientConfig::new(api_key).with_base_url(self.base_url.clone())
    }

    /// Number of requests received so far
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn revoke(&self, api_key: &str) {
        self.state.keys.lock().unwrap().remove(api_key);
    }

    /// Answer every workflow upload with a fixed status and raw body
    pub fn set_workflow_reply(&self, status: StatusCode, body: &str) {
        *self.state.workflow_reply.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Answer every chat with a fixed status and raw body
    pub fn set_chat_reply(&self, status: StatusCode, body: &str) {
        *self.state.chat_reply.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn uploads(&self) -> Vec<Value> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<Value> {
        self.state.chats.lock().unwrap().clone()
    }
}

/// Find a local address nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe");
    let addr = listener.local_addr().expect("Failed to read probe address");
    drop(listener);
    format!("http://{addr}")
}

/// Local address that accepts connections but never answers
///
/// The listener stays open for the life of the returned task.
pub async fn silent_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind silent listener");
    let addr = listener.local_addr().expect("Failed to read silent address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Invalid API key" })),
    )
        .into_response()
}

async fn user(State(state): State<Arc<ServiceState>>, headers: HeaderMap) -> Response {
    if state.authorized(&headers) {
        return Json(json!({ "status_code": 200, "content": { "valid": "user-1" } }))
            .into_response();
    }
    if bearer(&headers).as_deref() == Some(UNASSOCIATED_KEY) {
        return Json(json!({ "status_code": 200, "content": { "valid": null } })).into_response();
    }
    unauthorized()
}

async fn workflow_config(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.uploads.lock().unwrap().push(body.clone());

    if let Some((status, raw)) = state.workflow_reply.lock().unwrap().clone() {
        return (status, raw).into_response();
    }

    if !body["agents_data"].is_object() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "agents_data must be a JSON object" })),
        )
            .into_response();
    }

    let id = state.next_workflow.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status_code": 200, "workflow_id": format!("wf_{id}") })).into_response()
}

async fn chat(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.chats.lock().unwrap().push(body.clone());

    if let Some((status, raw)) = state.chat_reply.lock().unwrap().clone() {
        return (status, raw).into_response();
    }

    let workflow_id = body["workflow_id"].as_str().unwrap_or_default();
    if !workflow_id.starts_with("wf_") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Workflow not found" })),
        )
            .into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    let context = body["context"].as_str().unwrap_or_default();
    let answer = format!("You asked: {query}");
    let citation = if context.is_empty() {
        Value::Null
    } else {
        json!([context])
    };

    Json(json!({
        "final_answer": answer,
        "conversation": [
            { "role": "user", "content": query },
            { "role": "assistant", "content": answer }
        ],
        "citation": citation
    }))
    .into_response()
}

async fn session_history(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "session_id": body["session_id"],
        "history": [{ "query": "Hello", "answer": "You asked: Hello" }]
    }))
    .into_response()
}

async fn list_workflows(State(state): State<Arc<ServiceState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "templates": [{ "workflow_id": "wf_1", "name": "Support triage" }],
        "workflows_count": 1
    }))
    .into_response()
}

async fn workflows_by_model(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let model_id = params.get("model_id").cloned().unwrap_or_default();
    Json(json!({ "workflows": [{ "workflow_id": "wf_1", "model_id": model_id }] }))
        .into_response()
}

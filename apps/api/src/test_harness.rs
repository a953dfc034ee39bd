//! Router-level test harness: in-memory stores, scripted workflows, and
//! helpers to drive requests through the full Axum stack.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::models::session::SessionRow;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::{InMemoryBlobStore, InMemoryJobCache, InMemorySessionStore};
use crate::workflow::{
    FixtureWorkflow, Workflow, WorkflowError, WorkflowOutput, WorkflowSource,
};

pub struct TestApp {
    pub state: AppState,
    pub sessions: InMemorySessionStore,
    pub job_cache: InMemoryJobCache,
    pub blobs: InMemoryBlobStore,
}

impl TestApp {
    /// App wired to fixture workflows, as when no webhooks are configured.
    pub fn new() -> Self {
        Self::with_workflows(
            Arc::new(FixtureWorkflow::scrape()),
            Arc::new(FixtureWorkflow::analysis()),
        )
    }

    pub fn with_workflows(scrape: Arc<dyn Workflow>, analyze: Arc<dyn Workflow>) -> Self {
        let sessions = InMemorySessionStore::default();
        let job_cache = InMemoryJobCache::default();
        let blobs = InMemoryBlobStore::default();

        let state = AppState {
            sessions: Arc::new(sessions.clone()),
            job_cache: Arc::new(job_cache.clone()),
            blobs: Arc::new(blobs.clone()),
            scrape_workflow: scrape,
            analyze_workflow: analyze,
            job_cache_ttl: chrono::Duration::hours(24),
            session_ttl: chrono::Duration::hours(168),
        };

        Self {
            state,
            sessions,
            job_cache,
            blobs,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn create_session(&self) -> SessionRow {
        let (status, body) = self
            .send(json_request(Method::POST, "/api/session", Value::Null))
            .await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(body["session"].clone()).unwrap()
    }

    pub fn session(&self, id: uuid::Uuid) -> SessionRow {
        self.sessions.snapshot(id).expect("session exists")
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    if body.is_null() {
        builder.body(Body::empty()).unwrap()
    } else {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

/// Live workflow that counts invocations and always returns the same payload.
pub struct CountingWorkflow {
    calls: AtomicUsize,
    response: Value,
}

impl CountingWorkflow {
    pub fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Workflow for CountingWorkflow {
    async fn run(&self, _payload: &Value) -> Result<WorkflowOutput, WorkflowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(WorkflowOutput {
            data: self.response.clone(),
            source: WorkflowSource::Live,
        })
    }
}

pub struct FailingWorkflow;

#[async_trait]
impl Workflow for FailingWorkflow {
    async fn run(&self, _payload: &Value) -> Result<WorkflowOutput, WorkflowError> {
        Err(WorkflowError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

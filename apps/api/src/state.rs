use std::sync::Arc;

use chrono::Duration;

use crate::store::blob::BlobStore;
use crate::store::{JobCacheStore, SessionStore};
use crate::workflow::Workflow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub job_cache: Arc<dyn JobCacheStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Webhook or fixture provider, fixed at startup.
    pub scrape_workflow: Arc<dyn Workflow>,
    pub analyze_workflow: Arc<dyn Workflow>,
    pub job_cache_ttl: Duration,
    pub session_ttl: Duration,
}

//! External workflow seam: job scraping and resume analysis both run in an
//! outside automation system reached by a single JSON webhook call.
//!
//! Each endpoint gets its own `Arc<dyn Workflow>` in `AppState`, chosen once
//! at startup: `WebhookWorkflow` when a URL is configured, otherwise
//! `FixtureWorkflow` with a canned payload.

pub mod fixtures;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub use fixtures::FixtureWorkflow;
pub use webhook::WebhookWorkflow;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Webhook returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where a workflow result came from. Fixture results are tagged `mock: true`
/// in responses so callers can tell them apart from live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowSource {
    Live,
    Fixture,
}

#[derive(Debug, Clone)]
pub struct WorkflowOutput {
    pub data: Value,
    pub source: WorkflowSource,
}

impl WorkflowOutput {
    pub fn is_fixture(&self) -> bool {
        self.source == WorkflowSource::Fixture
    }
}

/// A single-shot external workflow: JSON in, JSON out. No retries.
#[async_trait]
pub trait Workflow: Send + Sync {
    async fn run(&self, payload: &Value) -> Result<WorkflowOutput, WorkflowError>;
}

#[derive(Debug, Clone, Copy)]
pub enum WorkflowKind {
    Scrape,
    Analyze,
}

impl WorkflowKind {
    fn name(self) -> &'static str {
        match self {
            WorkflowKind::Scrape => "scrape",
            WorkflowKind::Analyze => "analyze",
        }
    }
}

/// Picks the live webhook when configured, the fixture provider otherwise.
pub fn select_workflow(
    kind: WorkflowKind,
    webhook_url: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn Workflow>> {
    match webhook_url {
        Some(url) => {
            info!("{} workflow: webhook {url}", kind.name());
            Ok(Arc::new(WebhookWorkflow::new(kind.name(), url, timeout)?))
        }
        None => {
            warn!(
                "{} workflow: no webhook configured, serving fixture responses",
                kind.name()
            );
            Ok(Arc::new(match kind {
                WorkflowKind::Scrape => FixtureWorkflow::scrape(),
                WorkflowKind::Analyze => FixtureWorkflow::analysis(),
            }))
        }
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::workflow::{Workflow, WorkflowError, WorkflowOutput, WorkflowSource};

/// Live workflow reached over an HTTP webhook.
#[derive(Clone)]
pub struct WebhookWorkflow {
    client: Client,
    name: &'static str,
    url: String,
}

impl WebhookWorkflow {
    pub fn new(name: &'static str, url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;

        Ok(Self {
            client,
            name,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Workflow for WebhookWorkflow {
    async fn run(&self, payload: &Value) -> Result<WorkflowOutput, WorkflowError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} webhook returned {}: {}", self.name, status, body);
            return Err(WorkflowError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let data: Value = serde_json::from_str(&body)?;
        debug!("{} webhook succeeded ({} bytes)", self.name, body.len());

        Ok(WorkflowOutput {
            data,
            source: WorkflowSource::Live,
        })
    }
}

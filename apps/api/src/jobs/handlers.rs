use axum::{extract::State, Json};
use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::session::SessionPatch;
use crate::routes::is_false;
use crate::sessions::parse_session_id;
use crate::state::AppState;
use crate::store::update_session;

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    /// Kept loose so a non-string URL is reported as a bad URL.
    pub url: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Value,
    #[serde(skip_serializing_if = "is_false")]
    pub cached: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// POST /api/scrape
///
/// Cache hit → cached content, no workflow call. Miss → scrape workflow; live
/// results are cached for `job_cache_ttl`, fixture results are not.
pub async fn handle_scrape(
    State(state): State<AppState>,
    AppJson(req): AppJson<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, AppError> {
    let invalid_url = || AppError::Validation("Invalid URL format".to_string());
    let url = match &req.url {
        Some(Value::String(raw)) => raw.trim(),
        Some(_) => return Err(invalid_url()),
        None => "",
    };
    if url.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }
    Url::parse(url).map_err(|_| invalid_url())?;

    // Optional here: a blank id means the scrape is not tied to a session.
    let raw_session_id = req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let session_id = match raw_session_id {
        Some(raw) => {
            let id = parse_session_id(Some(raw))?;
            if state.sessions.get(id).await?.is_none() {
                return Err(AppError::session_not_found());
            }
            Some(id)
        }
        None => None,
    };

    let now = Utc::now();
    let cached = match state.job_cache.get_fresh(url, now).await {
        Ok(hit) => hit,
        Err(e) => {
            warn!("Job cache lookup failed for {url}, treating as miss: {e}");
            None
        }
    };

    if let Some(entry) = cached {
        info!("Job cache hit for {url}");
        record_job_description(&state, session_id, &entry.parsed_content).await;
        return Ok(Json(ScrapeResponse {
            success: true,
            data: entry.parsed_content,
            cached: true,
            mock: false,
        }));
    }

    info!("Job cache miss for {url}, running scrape workflow");
    let output = state
        .scrape_workflow
        .run(&json!({ "url": url, "sessionId": session_id }))
        .await
        .map_err(|e| AppError::Workflow {
            message: "Failed to scrape job description",
            detail: e.to_string(),
        })?;

    if !output.is_fixture() {
        let expires_at = now + state.job_cache_ttl;
        if let Err(e) = state.job_cache.upsert(url, &output.data, expires_at).await {
            warn!("Failed to cache scrape result for {url}: {e}");
        }
    }

    record_job_description(&state, session_id, &output.data).await;

    Ok(Json(ScrapeResponse {
        success: true,
        mock: output.is_fixture(),
        data: output.data,
        cached: false,
    }))
}

/// Best effort: the scraped content is returned to the client either way.
async fn record_job_description(state: &AppState, session_id: Option<Uuid>, content: &Value) {
    let Some(id) = session_id else {
        return;
    };
    let patch = SessionPatch {
        job_description: Some(Some(content.clone())),
        ..SessionPatch::default()
    };
    if let Err(e) = update_session(state.sessions.as_ref(), id, patch).await {
        error!("Failed to store job description on session {id}: {e}");
    }
}

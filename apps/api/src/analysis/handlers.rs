use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::QUESTIONS_STEP;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::session::SessionPatch;
use crate::routes::is_false;
use crate::sessions::parse_session_id;
use crate::state::AppState;
use crate::store::update_session;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: Value,
    #[serde(skip_serializing_if = "is_false")]
    pub mock: bool,
}

/// POST /api/analyze
///
/// Sends the session's job description and resume to the analysis workflow and
/// stores the result on the session.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(req): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let session_id = parse_session_id(req.session_id.as_deref())?;
    let session = state
        .sessions
        .get(session_id)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    if !session.ready_for_analysis() {
        return Err(AppError::Validation(
            "Missing job description or resume data".to_string(),
        ));
    }

    let payload = json!({
        "sessionId": session_id,
        "jobDescription": session.job_description,
        "resumeData": session.resume_data,
    });
    let output = state
        .analyze_workflow
        .run(&payload)
        .await
        .map_err(|e| AppError::Workflow {
            message: "Failed to analyze resume",
            detail: e.to_string(),
        })?;

    let patch = SessionPatch {
        analysis_data: Some(Some(output.data.clone())),
        current_step: Some(Some(QUESTIONS_STEP)),
        ..SessionPatch::default()
    };
    update_session(state.sessions.as_ref(), session_id, patch).await?;

    info!(
        "Stored analysis for session {session_id} (fixture: {})",
        output.is_fixture()
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        mock: output.is_fixture(),
        analysis: output.data,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::session::SessionPatch;
    use crate::store::update_session;
    use crate::test_harness::{
        error_message, json_request, CountingWorkflow, FailingWorkflow, TestApp,
    };
    use crate::workflow::FixtureWorkflow;

    async fn session_with_inputs(app: &TestApp) -> Uuid {
        let session = app.create_session().await;
        let patch = SessionPatch {
            job_description: Some(Some(json!({"raw_text": "Rust engineer wanted"}))),
            resume_data: Some(Some(json!({"raw_text": "Ten years of Rust"}))),
            ..SessionPatch::default()
        };
        update_session(app.state.sessions.as_ref(), session.id, patch)
            .await
            .unwrap();
        session.id
    }

    #[tokio::test]
    async fn test_analyze_without_inputs_is_bad_request() {
        let app = TestApp::new();
        let session = app.create_session().await;

        let (status, body) = app
            .send(json_request(
                Method::POST,
                "/api/analyze",
                json!({"sessionId": session.id}),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&body),
            "Missing job description or resume data"
        );
    }

    #[tokio::test]
    async fn test_fixture_analysis_is_stored_and_flagged() {
        let app = TestApp::new();
        let id = session_with_inputs(&app).await;

        let (status, body) = app
            .send(json_request(Method::POST, "/api/analyze", json!({"sessionId": id})))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mock"], true);
        assert_eq!(body["analysis"]["ats_score"], 72);

        let stored = app.session(id);
        assert_eq!(stored.current_step, Some(3));
        assert_eq!(stored.analysis_data.unwrap()["ats_score"], 72);
    }

    #[tokio::test]
    async fn test_live_analysis_is_not_flagged_mock() {
        let analyze = CountingWorkflow::new(json!({"questions": [], "ats_score": 90}));
        let app = TestApp::with_workflows(Arc::new(FixtureWorkflow::scrape()), analyze.clone());
        let id = session_with_inputs(&app).await;

        let (status, body) = app
            .send(json_request(Method::POST, "/api/analyze", json!({"sessionId": id})))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("mock").is_none());
        assert_eq!(analyze.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_requires_known_session() {
        let app = TestApp::new();

        let (status, body) = app
            .send(json_request(Method::POST, "/api/analyze", json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Session ID is required");

        let (status, _) = app
            .send(json_request(
                Method::POST,
                "/api/analyze",
                json!({"sessionId": Uuid::new_v4()}),
            ))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_workflow_failure_leaves_session_untouched() {
        let app = TestApp::with_workflows(
            Arc::new(FixtureWorkflow::scrape()),
            Arc::new(FailingWorkflow),
        );
        let id = session_with_inputs(&app).await;

        let (status, body) = app
            .send(json_request(Method::POST, "/api/analyze", json!({"sessionId": id})))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(&body), "Failed to analyze resume");
        assert!(app.session(id).analysis_data.is_none());
    }
}

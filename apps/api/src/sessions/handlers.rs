use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::session::{SessionPatch, SessionRow};
use crate::sessions::parse_session_id;
use crate::state::AppState;
use crate::store::update_session;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionRow,
}

/// POST /api/session
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let expires_at = Utc::now() + state.session_ttl;
    let session = state.sessions.create(Some(expires_at)).await?;
    info!("Created session {}", session.id);
    Ok(Json(SessionResponse { session }))
}

/// GET /api/session?id=<id>
pub async fn handle_get_session(
    State(state): State<AppState>,
    Query(params): Query<SessionQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_session_id(params.id.as_deref())?;
    let session = state
        .sessions
        .get(id)
        .await?
        .ok_or_else(AppError::session_not_found)?;
    Ok(Json(SessionResponse { session }))
}

/// PATCH /api/session
///
/// Body is `{sessionId, ...fields}`; every other key is a session column to merge.
pub async fn handle_update_session(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<SessionResponse>, AppError> {
    let Value::Object(mut fields) = body else {
        return Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let raw_id = fields.remove("sessionId");
    let id = parse_session_id(raw_id.as_ref().and_then(Value::as_str))?;
    let patch = SessionPatch::from_fields(fields)?;

    if patch.is_empty() {
        debug!("Empty patch for session {id}");
        let session = state
            .sessions
            .get(id)
            .await?
            .ok_or_else(AppError::session_not_found)?;
        return Ok(Json(SessionResponse { session }));
    }

    let session = update_session(state.sessions.as_ref(), id, patch).await?;
    Ok(Json(SessionResponse { session }))
}

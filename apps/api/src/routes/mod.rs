pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::sessions::handlers as sessions;
use crate::state::AppState;
use crate::uploads::{handlers as uploads, UPLOAD_BODY_LIMIT};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/session",
            post(sessions::handle_create_session)
                .get(sessions::handle_get_session)
                .patch(sessions::handle_update_session),
        )
        .route(
            "/api/upload",
            post(uploads::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/scrape", post(jobs::handle_scrape))
        .route("/api/analyze", post(analysis::handle_analyze))
        .with_state(state)
}

/// Used with `skip_serializing_if` so `cached` / `mock` flags only appear when set.
pub(crate) fn is_false(flag: &bool) -> bool {
    !*flag
}

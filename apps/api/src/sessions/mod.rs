pub mod handlers;

use uuid::Uuid;

use crate::errors::AppError;

/// Resolves a client-supplied session id. Absent or blank → 400; anything
/// that is not a UUID cannot name a session → 404.
pub fn parse_session_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(AppError::session_id_required)?;
    Uuid::parse_str(raw).map_err(|_| AppError::session_not_found())
}

pub mod handlers;

use uuid::Uuid;

use crate::errors::AppError;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// 10 MiB.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Request body cap for the upload route. Larger than `MAX_FILE_SIZE` so
/// oversized files reach the size check and get a descriptive 400.
pub const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub fn validate_file(content_type: &str, size: usize) -> Result<(), AppError> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !ALLOWED_CONTENT_TYPES.contains(&essence) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload PDF, DOCX, or TXT files.".to_string(),
        ));
    }
    if size > MAX_FILE_SIZE {
        return Err(AppError::Validation(
            "File too large. Maximum size is 10MB.".to_string(),
        ));
    }
    Ok(())
}

/// Fallback extension when the file name has no usable one.
const DEFAULT_EXTENSION: &str = "bin";

/// `<session_id>/<unix_millis>.<ext>`, where ext follows the last dot of the
/// original file name. Anything other than ASCII alphanumerics falls back to
/// `bin` so the client's name can never add key segments.
pub fn storage_key(session_id: Uuid, file_name: &str, unix_millis: i64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{session_id}/{unix_millis}.{ext}")
}

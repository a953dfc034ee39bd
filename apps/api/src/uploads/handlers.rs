use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::session::SessionPatch;
use crate::sessions::parse_session_id;
use crate::state::AppState;
use crate::store::update_session;
use crate::uploads::{storage_key, validate_file};

struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub path: String,
    pub url: String,
    pub file_name: String,
}

/// POST /api/upload
///
/// Multipart form with `file` and `sessionId`. Stores the file and records its
/// metadata as the session's `resume_data`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut raw_session_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        match field.name().map(str::to_string).as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(invalid_multipart)?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some("sessionId") => {
                raw_session_id = Some(field.text().await.map_err(invalid_multipart)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let raw_session_id = raw_session_id.ok_or_else(AppError::session_id_required)?;
    validate_file(&file.content_type, file.data.len())?;

    let session_id = parse_session_id(Some(&raw_session_id))?;
    if state.sessions.get(session_id).await?.is_none() {
        return Err(AppError::session_not_found());
    }

    let now = Utc::now();
    let key = storage_key(session_id, &file.file_name, now.timestamp_millis());
    let file_size = file.data.len();
    let path = state
        .blobs
        .put(&key, file.data, &file.content_type)
        .await?;
    let url = state.blobs.public_url(&path);

    info!(
        "Stored {} ({} bytes) for session {session_id}",
        file.file_name, file_size
    );

    let patch = SessionPatch {
        resume_data: Some(Some(json!({
            "file_url": path,
            "file_name": file.file_name,
            "file_type": file.content_type,
            "file_size": file_size,
            "uploaded_at": now.to_rfc3339(),
        }))),
        ..SessionPatch::default()
    };
    if let Err(e) = update_session(state.sessions.as_ref(), session_id, patch).await {
        // The blob is already stored; the response still points at it.
        error!("Failed to record upload on session {session_id}: {e}");
    }

    Ok(Json(UploadResponse {
        success: true,
        path,
        url,
        file_name: file.file_name,
    }))
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use uuid::Uuid;

    use crate::test_harness::{error_message, TestApp};
    use crate::uploads::MAX_FILE_SIZE;

    const BOUNDARY: &str = "X-TAILOR-BOUNDARY";

    fn multipart_request(
        file: Option<(&str, &str, Vec<u8>)>,
        session_id: Option<&str>,
    ) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(id) = session_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"sessionId\"\r\n\r\n{id}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(&data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_records_metadata() {
        let app = TestApp::new();
        let session = app.create_session().await;
        let id = session.id.to_string();

        let (status, body) = app
            .send(multipart_request(
                Some(("resume.pdf", "application/pdf", b"%PDF-1.7 resume".to_vec())),
                Some(&id),
            ))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["fileName"], "resume.pdf");

        let path = body["path"].as_str().unwrap();
        assert!(path.starts_with(&format!("{id}/")));
        assert!(path.ends_with(".pdf"));
        assert!(body["url"].as_str().unwrap().ends_with(path));

        let (stored, content_type) = app.blobs.get(path).unwrap();
        assert_eq!(&stored[..], b"%PDF-1.7 resume");
        assert_eq!(content_type, "application/pdf");

        let resume_data = app.session(session.id).resume_data.unwrap();
        assert_eq!(resume_data["file_url"], path);
        assert_eq!(resume_data["file_name"], "resume.pdf");
        assert_eq!(resume_data["file_size"], 15);
    }

    #[tokio::test]
    async fn test_upload_rejects_fifteen_mib_file() {
        let app = TestApp::new();
        let session = app.create_session().await;

        let (status, body) = app
            .send(multipart_request(
                Some(("big.pdf", "application/pdf", vec![b'a'; 15 * 1024 * 1024])),
                Some(&session.id.to_string()),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "File too large. Maximum size is 10MB.");
    }

    #[tokio::test]
    async fn test_upload_accepts_file_at_exact_limit() {
        let app = TestApp::new();
        let session = app.create_session().await;

        let (status, _) = app
            .send(multipart_request(
                Some(("resume.txt", "text/plain", vec![b'a'; MAX_FILE_SIZE])),
                Some(&session.id.to_string()),
            ))
            .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let app = TestApp::new();
        let session = app.create_session().await;

        let (status, body) = app
            .send(multipart_request(
                Some(("photo.png", "image/png", vec![1, 2, 3])),
                Some(&session.id.to_string()),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(&body),
            "Invalid file type. Please upload PDF, DOCX, or TXT files."
        );
    }

    #[tokio::test]
    async fn test_upload_requires_file_then_session() {
        let app = TestApp::new();

        let (status, body) = app.send(multipart_request(None, Some("abc"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "No file provided");

        let (status, body) = app
            .send(multipart_request(
                Some(("resume.txt", "text/plain", b"hello".to_vec())),
                None,
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Session ID is required");
    }

    #[tokio::test]
    async fn test_upload_for_unknown_session_is_not_found() {
        let app = TestApp::new();

        let (status, _) = app
            .send(multipart_request(
                Some(("resume.txt", "text/plain", b"hello".to_vec())),
                Some(&Uuid::new_v4().to_string()),
            ))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

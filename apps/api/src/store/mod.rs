//! Persistence seams. Handlers only see these traits; `AppState` carries
//! `Arc<dyn ...>` handles so the Postgres/S3 backends can be swapped for the
//! in-memory ones in tests.

pub mod blob;
#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_cache::JobCacheRow;
use crate::models::session::{SessionPatch, SessionRow};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, expires_at: Option<DateTime<Utc>>) -> Result<SessionRow, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<SessionRow>, AppError>;

    /// Writes only the columns `patch` sets and bumps `updated_at`.
    /// Returns `None` when the session does not exist.
    async fn update(&self, id: Uuid, patch: SessionPatch) -> Result<Option<SessionRow>, AppError>;
}

#[async_trait]
pub trait JobCacheStore: Send + Sync {
    /// Returns the entry for `url` only if it has not expired at `now`.
    async fn get_fresh(&self, url: &str, now: DateTime<Utc>)
        -> Result<Option<JobCacheRow>, AppError>;

    async fn upsert(
        &self,
        url: &str,
        parsed_content: &Value,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Applies `patch` to a session, 404 if it does not exist. Patches touching
/// different columns never overwrite each other; the same column is last-write-wins.
pub async fn update_session(
    store: &dyn SessionStore,
    id: Uuid,
    patch: SessionPatch,
) -> Result<SessionRow, AppError> {
    store
        .update(id, patch)
        .await?
        .ok_or_else(AppError::session_not_found)
}

//! In-memory store backends used by handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_cache::JobCacheRow;
use crate::models::session::{SessionPatch, SessionRow};
use crate::store::blob::BlobStore;
use crate::store::{JobCacheStore, SessionStore};

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    rows: Arc<Mutex<HashMap<Uuid, SessionRow>>>,
}

impl InMemorySessionStore {
    pub fn insert(&self, row: SessionRow) {
        self.rows.lock().unwrap().insert(row.id, row);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<SessionRow> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, expires_at: Option<DateTime<Utc>>) -> Result<SessionRow, AppError> {
        let row = SessionRow::new(Uuid::new_v4(), Utc::now(), expires_at);
        self.insert(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SessionRow>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: SessionPatch) -> Result<Option<SessionRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|row| {
            patch.apply(row, Utc::now());
            row.clone()
        }))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryJobCache {
    rows: Arc<Mutex<HashMap<String, JobCacheRow>>>,
}

impl InMemoryJobCache {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl JobCacheStore for InMemoryJobCache {
    async fn get_fresh(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<JobCacheRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(url)
            .filter(|row| row.expires_at > now)
            .cloned())
    }

    async fn upsert(
        &self,
        url: &str,
        parsed_content: &Value,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.rows.lock().unwrap().insert(
            url.to_string(),
            JobCacheRow {
                id: Uuid::new_v4(),
                url: url.to_string(),
                parsed_content: parsed_content.clone(),
                created_at: Utc::now(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, (Bytes, String)>>>,
}

impl InMemoryBlobStore {
    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        self.objects.lock().unwrap().insert(key.to_string(), (body, content_type.to_string()));
        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://blobs.test/resumes/{key}")
    }
}

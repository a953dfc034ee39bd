use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobCacheRow {
    pub id: Uuid,
    pub url: String,
    pub parsed_content: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

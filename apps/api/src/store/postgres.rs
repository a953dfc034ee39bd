use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_cache::JobCacheRow;
use crate::models::session::{SessionPatch, SessionRow};
use crate::store::{JobCacheStore, SessionStore};

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, expires_at: Option<DateTime<Utc>>) -> Result<SessionRow, AppError> {
        let new_row = SessionRow::new(Uuid::new_v4(), Utc::now(), expires_at);
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, current_step, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new_row.id)
        .bind(new_row.current_step)
        .bind(new_row.created_at)
        .bind(new_row.updated_at)
        .bind(new_row.expires_at)
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted session {}", row.id);
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SessionRow>, AppError> {
        Ok(
            sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update(&self, id: Uuid, patch: SessionPatch) -> Result<Option<SessionRow>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE sessions SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(v) = patch.job_description {
            query.push(", job_description = ").push_bind(v);
        }
        if let Some(v) = patch.resume_data {
            query.push(", resume_data = ").push_bind(v);
        }
        if let Some(v) = patch.analysis_data {
            query.push(", analysis_data = ").push_bind(v);
        }
        if let Some(v) = patch.current_step {
            query.push(", current_step = ").push_bind(v);
        }
        if let Some(v) = patch.answers {
            query.push(", answers = ").push_bind(v);
        }

        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        Ok(query
            .build_query_as::<SessionRow>()
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[derive(Clone)]
pub struct PgJobCacheStore {
    pool: PgPool,
}

impl PgJobCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobCacheStore for PgJobCacheStore {
    async fn get_fresh(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<JobCacheRow>, AppError> {
        Ok(sqlx::query_as::<_, JobCacheRow>(
            "SELECT * FROM job_cache WHERE url = $1 AND expires_at > $2",
        )
        .bind(url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert(
        &self,
        url: &str,
        parsed_content: &Value,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO job_cache (url, parsed_content, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (url) DO UPDATE
            SET parsed_content = EXCLUDED.parsed_content,
                expires_at = EXCLUDED.expires_at,
                created_at = now()
            "#,
        )
        .bind(url)
        .bind(parsed_content)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL used to build public links for uploaded files. Defaults to the S3 endpoint.
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Scrape workflow webhook. When unset, scrape requests are answered from fixtures.
    pub scrape_webhook_url: Option<String>,
    /// Analysis workflow webhook. When unset, analyze requests are answered from fixtures.
    pub analyze_webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub job_cache_ttl_hours: i64,
    pub session_ttl_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone()),
            s3_endpoint,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            scrape_webhook_url: optional_env("SCRAPE_WEBHOOK_URL"),
            analyze_webhook_url: optional_env("ANALYZE_WEBHOOK_URL"),
            webhook_timeout_secs: parse_env("WEBHOOK_TIMEOUT_SECS", 120)?,
            job_cache_ttl_hours: parse_env("JOB_CACHE_TTL_HOURS", 24)?,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 168)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

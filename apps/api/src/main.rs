mod analysis;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod models;
mod routes;
mod sessions;
mod state;
mod store;
#[cfg(test)]
mod test_harness;
mod uploads;
mod workflow;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::blob::S3BlobStore;
use crate::store::postgres::{PgJobCacheStore, PgSessionStore};
use crate::workflow::{select_workflow, WorkflowKind};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (sessions + job cache)
    let db = create_pool(&config.database_url).await?;

    // S3 / MinIO (uploaded resumes)
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Workflow providers are fixed for the lifetime of the process
    let webhook_timeout = Duration::from_secs(config.webhook_timeout_secs);
    let scrape_workflow = select_workflow(
        WorkflowKind::Scrape,
        config.scrape_webhook_url.as_deref(),
        webhook_timeout,
    )?;
    let analyze_workflow = select_workflow(
        WorkflowKind::Analyze,
        config.analyze_webhook_url.as_deref(),
        webhook_timeout,
    )?;

    let state = AppState {
        sessions: Arc::new(PgSessionStore::new(db.clone())),
        job_cache: Arc::new(PgJobCacheStore::new(db)),
        blobs: Arc::new(S3BlobStore::new(
            s3,
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
        )),
        scrape_workflow,
        analyze_workflow,
        job_cache_ttl: chrono::Duration::hours(config.job_cache_ttl_hours),
        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "tailor-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets under the path, not a subdomain
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

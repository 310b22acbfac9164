mod alerts;
mod applications;
mod auth;
mod backend;
mod cache;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod profile;
mod resumes;
mod routes;
mod state;
mod storage;
mod tailoring;
mod util;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::backend::PgBackend;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::ObjectStorage;
use crate::tailoring::{RetryPolicy, TailorClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobpilot API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL, with migrations applied
    let pool = create_pool(&config.database_url).await?;
    let backend = Arc::new(PgBackend::new(pool));

    // Redis-backed query cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = QueryCache::new(redis, config.query_stale_time);
    info!(
        "Query cache initialized (stale after {}s)",
        config.query_stale_time.as_secs()
    );

    // S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let storage = ObjectStorage::new(s3, config.s3_bucket.clone(), config.s3_public_url.clone());
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Remote tailoring function
    let tailor = TailorClient::new(
        config.tailor_function_url.clone(),
        config.tailor_function_key.clone(),
        RetryPolicy::new(config.tailor_max_attempts),
    )?;
    info!(
        "Tailoring client initialized ({} attempts max)",
        config.tailor_max_attempts
    );

    let state = AppState {
        backend,
        cache,
        storage,
        jwt: JwtVerifier::new(&config.jwt_secret),
        tailor: Arc::new(tailor),
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
        "jobpilot-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by subdomain.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

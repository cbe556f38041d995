//! Reelbox API server entrypoint

use anyhow::{Context, Result};
use reelbox_api::{
    auth::HttpIdentityProvider, config::ApiConfig, create_router, metrics::Metrics,
    telemetry::init_tracing, AppState,
};
use reelbox_domain::VideoService;
use reelbox_postgres::PgVideoRepository;
use reelbox_s3::{S3StorageConfig, S3VideoStorage};
use reelbox_sns::{SnsEventPublisher, SnsPublisherConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    init_tracing(&config.log_level, config.log_format);

    info!(service = %config.service_name, "Starting Reelbox API");

    let storage = S3VideoStorage::connect(S3StorageConfig {
        bucket: config.s3_bucket.clone(),
        region: config.aws_region.clone(),
        endpoint_url: config.aws_endpoint_url.clone(),
    })
    .await;

    let repository =
        PgVideoRepository::connect(&config.database_url, config.database_max_connections)
            .await
            .context("failed to connect to PostgreSQL")?;
    repository
        .migrate()
        .await
        .context("failed to run database migrations")?;

    let publisher = SnsEventPublisher::connect(SnsPublisherConfig {
        topic_arn: config.sns_topic_arn.clone(),
        region: config.aws_region.clone(),
        endpoint_url: config.aws_endpoint_url.clone(),
    })
    .await;

    let identity = HttpIdentityProvider::new(&config.auth_service_url)
        .context("failed to build identity service client")?;
    let metrics = Metrics::new().context("failed to register metrics")?;

    let service = VideoService::new(storage, repository, publisher);
    let state = AppState::new(service, identity, metrics, &config.service_name);

    let app = create_router(state);

    let addr = config.bind_address();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

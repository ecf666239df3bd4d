//! Instance Advisor - replacement instance type recommendations over HTTP

use advisor_lib::{
    health::{components, HealthRegistry},
    observability::{AdvisorMetrics, StructuredLogger},
    RecommendationService,
};
use anyhow::{Context, Result};
use instance_advisor::{api, config::AdvisorConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = AdvisorConfig::load()?;
    info!(
        data_root = %config.data_root.display(),
        api_port = config.api_port,
        "Advisor configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::TABLE_SOURCE).await;

    let metrics = AdvisorMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let service = RecommendationService::new(
        config.data_root.clone(),
        client,
        metrics,
        logger.clone(),
        health_registry.clone(),
    );
    let app_state = Arc::new(api::AppState::new(service, health_registry.clone()));

    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    health_registry.set_ready(true).await;
    logger.log_startup(ADVISOR_VERSION, &addr);

    let shutdown_logger = logger.clone();
    api::serve(listener, app_state, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}

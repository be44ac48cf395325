use news_service::config::NewsConfig;
use news_service::services::init_metrics;
use news_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NewsConfig::load()?;

    init_tracing(
        "news-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    tracing::info!(production = config.production, "Starting news-service");

    let application = Application::build(config).await?;
    application.run_until_stopped(shutdown_signal()).await?;

    tracing::info!("News service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

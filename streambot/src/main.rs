use std::sync::Arc;

use anyhow::Context;
use streambot::api::{ApiServer, ApiServerConfig, AppState};
use streambot::config::AppConfig;
use streambot::services::ServiceContainer;
use streambot::{database, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let settings = AppConfig::from_env_or_default();

    // Initialize logging; the guard flushes the file writer on drop
    let (logging_config, _log_guard) = logging::init_logging(&settings.log_dir)?;

    // Initialize database
    let pool = database::init_pool(&settings.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database_url))?;

    // Run migrations
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let services = Arc::new(ServiceContainer::new(pool, settings).await?);
    services.initialize().await?;
    logging_config.start_retention_cleanup(services.cancellation_token());

    let state = AppState::new(services.clone()).with_logging_config(logging_config);
    let server = ApiServer::with_state(ApiServerConfig::from_env_or_default(), state);

    let server_token = server.cancel_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        server_token.cancel();
    });

    tracing::info!("streambot initialized successfully");
    let served = server.run().await;

    services.shutdown().await?;
    served?;

    tracing::info!("streambot stopped");
    Ok(())
}

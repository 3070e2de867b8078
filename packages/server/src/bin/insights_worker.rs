//! Industry Insights Worker
//!
//! Runs the scheduler that refreshes industry insights every week.

use anyhow::{Context, Result};
use insights_core::kernel::{start_scheduler, ServerDeps};
use insights_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,insights_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Industry Insights Worker");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = %config.gemini_model,
        schedule = %config.insights_schedule,
        failure_policy = %config.failure_policy,
        "Configuration loaded"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Build explicit clients and the refresher
    let deps = ServerDeps::from_config(&config, pool);
    let refresher = deps.insight_refresher(&config);

    let mut scheduler = start_scheduler(
        refresher,
        &config.insights_schedule,
        config.run_on_startup,
    )
    .await
    .context("Failed to start scheduler")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown signal received, stopping scheduler");
    scheduler
        .shutdown()
        .await
        .context("Failed to shut down scheduler")?;
    deps.db_pool.close().await;

    Ok(())
}

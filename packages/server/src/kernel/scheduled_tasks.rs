//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! This module registers the periodic insights refresh:
//! - Weekly industry insights refresh (every Sunday at midnight UTC by default)
//! - Optional one-shot run right after startup
//!
//! # Architecture
//!
//! ```text
//! Scheduler (weekly)
//!     │
//!     └─► run_insights_refresh()
//!             └─► For each industry → prompt model → parse → update record
//! ```

use anyhow::{Context, Result};
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::insights::{run_insights_refresh, InsightRefresher};

/// Start all scheduled tasks
pub async fn start_scheduler(
    refresher: InsightRefresher,
    schedule: &str,
    run_on_startup: bool,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(insights_refresh_job(refresher.clone(), schedule)?)
        .await?;

    if run_on_startup {
        scheduler.add(startup_refresh_job(refresher)?).await?;
    }

    scheduler.start().await?;

    tracing::info!(
        schedule = schedule,
        run_on_startup = run_on_startup,
        "Scheduled tasks started (industry insights refresh)"
    );
    Ok(scheduler)
}

/// Recurring refresh on a six-field cron expression (seconds first)
pub fn insights_refresh_job(refresher: InsightRefresher, schedule: &str) -> Result<Job> {
    Job::new_async(schedule, move |_uuid, _lock| {
        let refresher = refresher.clone();
        Box::pin(async move {
            run_refresh_task(&refresher).await;
        })
    })
    .with_context(|| format!("Invalid insights schedule '{}'", schedule))
}

/// Single refresh shortly after startup
fn startup_refresh_job(refresher: InsightRefresher) -> Result<Job> {
    Job::new_one_shot_async(Duration::from_secs(1), move |_uuid, _lock| {
        let refresher = refresher.clone();
        Box::pin(async move {
            run_refresh_task(&refresher).await;
        })
    })
    .context("Failed to create startup insights refresh job")
}

/// Run one refresh; failures never stop the scheduler.
///
/// A failed run has already been logged by [`run_insights_refresh`].
async fn run_refresh_task(refresher: &InsightRefresher) {
    tracing::info!("Running industry insights refresh task");

    match run_insights_refresh(refresher).await {
        Ok(report) => tracing::info!(
            updated = report.updated.len(),
            "Industry insights refresh task finished"
        ),
        Err(_) => tracing::info!("Industry insights refresh task finished with errors"),
    }
}

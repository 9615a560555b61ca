//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! One schedule: the daily maintenance run, triggered when local time
//! passes midnight. The run itself takes a store-level advisory lock, so a
//! delayed trigger cannot overlap a still-running prior invocation.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::maintenance;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job_deps = deps.clone();
    let daily_job = Job::new_async("0 0 0 * * *", move |_uuid, _lock| {
        let deps = job_deps.clone();
        Box::pin(async move {
            if let Err(e) = maintenance::run(&deps).await {
                tracing::error!("Daily maintenance failed: {}", e);
            }
        })
    })?;

    scheduler.add(daily_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (daily maintenance at midnight)");
    Ok(scheduler)
}

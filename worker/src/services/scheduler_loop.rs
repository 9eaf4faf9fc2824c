use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::services::cron_jobs::CronJobs;

/// Runs every scheduled job on a fixed interval inside the worker process.
/// Overlap with external triggers is safe; every transition is a conditional update.
pub async fn run(cron_jobs: Arc<CronJobs>, interval: Duration) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "scheduler_loop: starting");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        run_once(&cron_jobs).await;
    }
}

async fn run_once(cron_jobs: &CronJobs) {
    if let Err(e) = cron_jobs.run_ingestion(None).await {
        error!(error = ?e, "scheduler_loop: ingestion run failed");
    }

    let outcomes = cron_jobs.run_leaderboards().await;
    let failed = outcomes.iter().filter(|o| o.status != "ok").count();
    if failed > 0 {
        error!(failed, "scheduler_loop: some leaderboards failed");
    }

    if let Err(e) = cron_jobs.run_promotions().await {
        error!(error = ?e, "scheduler_loop: promotion sweep failed");
    }
}

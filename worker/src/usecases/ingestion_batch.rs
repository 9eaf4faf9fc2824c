use anyhow::Result;
use chrono::Utc;
use crates::domain::{
    entities::ingestion_jobs::IngestionJobEntity,
    repositories::{ingestion_jobs::IngestionJobRepository, platform_sync::PlatformSync},
    value_objects::{enums::platforms::Platform, ingestion_jobs::SyncRequest},
};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const STALE_CLAIM_MESSAGE: &str = "processing timed out";
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct IngestionBatchSettings {
    pub job_timeout: Duration,
    pub stale_after: chrono::Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionBatchResult {
    pub claimed: usize,
    pub completed: usize,
    pub failed: usize,
    pub stale_failed: usize,
    /// Claimed jobs that another invocation failed as stale before this run reached them.
    pub skipped: usize,
    /// Jobs that reached a terminal state in this run (completed + failed).
    pub processed: usize,
}

/// Claims queued jobs, runs each through the platform connector and records the outcome.
pub struct IngestionBatchUseCase {
    job_repository: Arc<dyn IngestionJobRepository + Send + Sync>,
    platform_sync: Arc<dyn PlatformSync + Send + Sync>,
    settings: IngestionBatchSettings,
}

impl IngestionBatchUseCase {
    pub fn new(
        job_repository: Arc<dyn IngestionJobRepository + Send + Sync>,
        platform_sync: Arc<dyn PlatformSync + Send + Sync>,
        settings: IngestionBatchSettings,
    ) -> Self {
        Self {
            job_repository,
            platform_sync,
            settings,
        }
    }

    /// Storage failures while reclaiming, claiming or renewing claims abort the run; a failing
    /// job does not.
    ///
    /// Before each sync the claims of the jobs still waiting in this batch are renewed, so
    /// `stale_after` only has to outlast a single job rather than the whole batch.
    pub async fn process_batch(&self, limit: i64) -> Result<IngestionBatchResult> {
        let now = Utc::now();

        let stale_failed = self
            .job_repository
            .fail_stale_processing_jobs(
                now - self.settings.stale_after,
                STALE_CLAIM_MESSAGE.to_string(),
                now,
            )
            .await?;
        if stale_failed > 0 {
            warn!(stale_failed, "ingestion_batch: failed stale processing jobs");
        }

        let jobs = self.job_repository.claim_queued_jobs(limit, now).await?;

        let mut result = IngestionBatchResult {
            claimed: jobs.len(),
            stale_failed,
            ..Default::default()
        };

        let mut pending: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();

        for job in jobs {
            let renewed = self
                .job_repository
                .renew_job_claims(pending.clone(), Utc::now())
                .await?;
            pending.retain(|job_id| *job_id != job.id);

            if !renewed.contains(&job.id) {
                warn!(job_id = %job.id, "ingestion_batch: claim lost before sync, skipping job");
                result.skipped += 1;
                continue;
            }

            let outcome = self.run_job(&job).await;
            let executed_at = Utc::now();

            let recorded = match outcome {
                Ok(()) => self
                    .job_repository
                    .mark_job_completed(job.id, executed_at)
                    .await
                    .map(|updated| {
                        if updated {
                            result.completed += 1;
                        }
                        updated
                    }),
                Err(message) => {
                    warn!(job_id = %job.id, platform = %job.platform, error = %message, "ingestion_batch: job failed");
                    self.job_repository
                        .mark_job_failed(job.id, message, executed_at)
                        .await
                        .map(|updated| {
                            if updated {
                                result.failed += 1;
                            }
                            updated
                        })
                }
            };

            match recorded {
                Ok(true) => {}
                Ok(false) => {
                    warn!(job_id = %job.id, "ingestion_batch: job left processing before its outcome was recorded");
                }
                Err(err) => {
                    // Stays in processing until the stale reclaim fails it.
                    error!(job_id = %job.id, error = ?err, "ingestion_batch: failed to record job outcome");
                }
            }
        }

        result.processed = result.completed + result.failed;

        info!(
            claimed = result.claimed,
            completed = result.completed,
            failed = result.failed,
            stale_failed = result.stale_failed,
            skipped = result.skipped,
            "ingestion_batch: completed"
        );

        Ok(result)
    }

    async fn run_job(&self, job: &IngestionJobEntity) -> Result<(), String> {
        let platform: Platform = job.platform.parse().map_err(|err| format!("{err}"))?;

        let request = SyncRequest {
            job_id: job.id,
            owner_id: job.owner_id,
            platform,
            payload: job.payload.clone(),
        };

        match tokio::time::timeout(self.settings.job_timeout, self.platform_sync.sync(request)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(summarize(&err)),
            Err(_) => Err(format!(
                "sync timed out after {}s",
                self.settings.job_timeout.as_secs()
            )),
        }
    }
}

fn summarize(err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return message;
    }
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

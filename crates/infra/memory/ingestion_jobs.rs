use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{JobTransition, MemoryStore, MemoryTables};
use crate::domain::{
    entities::ingestion_jobs::{IngestionJobEntity, InsertIngestionJobEntity},
    repositories::ingestion_jobs::IngestionJobRepository,
    value_objects::enums::job_statuses::JobStatus,
};

fn current_status(job: &IngestionJobEntity) -> Option<JobStatus> {
    JobStatus::from_str(&job.status)
}

/// Moves `job_id` from `from` to `to`; false when the job is missing or not in `from`.
fn transition(
    tables: &mut MemoryTables,
    job_id: Uuid,
    from: JobStatus,
    to: JobStatus,
    apply: impl FnOnce(&mut IngestionJobEntity),
) -> bool {
    let Some(job) = tables.jobs.get_mut(&job_id) else {
        return false;
    };
    if current_status(job) != Some(from) {
        return false;
    }

    job.status = to.to_string();
    apply(job);
    tables.job_transitions.push(JobTransition { job_id, from, to });
    true
}

#[async_trait]
impl IngestionJobRepository for MemoryStore {
    async fn insert_job(&self, insert_job_entity: InsertIngestionJobEntity) -> Result<Uuid> {
        let mut tables = self.tables()?;
        if tables.jobs.contains_key(&insert_job_entity.id) {
            bail!("duplicate job id {}", insert_job_entity.id);
        }

        let job = IngestionJobEntity {
            id: insert_job_entity.id,
            owner_id: insert_job_entity.owner_id,
            platform: insert_job_entity.platform,
            payload: insert_job_entity.payload,
            status: insert_job_entity.status,
            created_at: insert_job_entity.created_at,
            claimed_at: None,
            executed_at: None,
            error_message: None,
        };
        tables.jobs.insert(job.id, job);

        Ok(insert_job_entity.id)
    }

    async fn find_job_by_id(&self, job_id: Uuid) -> Result<Option<IngestionJobEntity>> {
        Ok(self.tables()?.jobs.get(&job_id).cloned())
    }

    async fn list_jobs_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<IngestionJobEntity>> {
        let tables = self.tables()?;
        let mut jobs: Vec<IngestionJobEntity> = tables
            .jobs
            .values()
            .filter(|job| job.owner_id == owner_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }

    async fn claim_queued_jobs(
        &self,
        limit: i64,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<IngestionJobEntity>> {
        let mut tables = self.tables()?;

        let mut candidates: Vec<(DateTime<Utc>, Uuid)> = tables
            .jobs
            .values()
            .filter(|job| current_status(job) == Some(JobStatus::Queued))
            .map(|job| (job.created_at, job.id))
            .collect();
        candidates.sort();
        candidates.truncate(limit.max(0) as usize);

        let mut claimed = Vec::with_capacity(candidates.len());
        for (_, job_id) in candidates {
            let moved = transition(
                &mut tables,
                job_id,
                JobStatus::Queued,
                JobStatus::Processing,
                |job| job.claimed_at = Some(claimed_at),
            );
            if moved {
                if let Some(job) = tables.jobs.get(&job_id) {
                    claimed.push(job.clone());
                }
            }
        }

        Ok(claimed)
    }

    async fn renew_job_claims(
        &self,
        job_ids: Vec<Uuid>,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let mut tables = self.tables()?;

        let mut renewed = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            if let Some(job) = tables.jobs.get_mut(&job_id) {
                if current_status(job) == Some(JobStatus::Processing) {
                    job.claimed_at = Some(claimed_at);
                    renewed.push(job_id);
                }
            }
        }

        Ok(renewed)
    }

    async fn mark_job_completed(&self, job_id: Uuid, executed_at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables()?;
        Ok(transition(
            &mut tables,
            job_id,
            JobStatus::Processing,
            JobStatus::Completed,
            |job| {
                job.executed_at = Some(executed_at);
                job.error_message = None;
            },
        ))
    }

    async fn mark_job_failed(
        &self,
        job_id: Uuid,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables()?;
        Ok(transition(
            &mut tables,
            job_id,
            JobStatus::Processing,
            JobStatus::Failed,
            |job| {
                job.executed_at = Some(executed_at);
                job.error_message = Some(error_message);
            },
        ))
    }

    async fn fail_stale_processing_jobs(
        &self,
        claimed_before: DateTime<Utc>,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut tables = self.tables()?;

        let stale: Vec<Uuid> = tables
            .jobs
            .values()
            .filter(|job| current_status(job) == Some(JobStatus::Processing))
            .filter(|job| job.claimed_at.is_some_and(|at| at < claimed_before))
            .map(|job| job.id)
            .collect();

        let mut failed = 0;
        for job_id in stale {
            let message = error_message.clone();
            if transition(
                &mut tables,
                job_id,
                JobStatus::Processing,
                JobStatus::Failed,
                |job| {
                    job.executed_at = Some(executed_at);
                    job.error_message = Some(message);
                },
            ) {
                failed += 1;
            }
        }

        Ok(failed)
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::ingestion_jobs::{IngestionJobEntity, InsertIngestionJobEntity};

/// Job Store. Every status change is a conditional update on the current status, so
/// overlapping scheduler invocations can never move the same job twice.
#[async_trait]
#[automock]
pub trait IngestionJobRepository {
    async fn insert_job(&self, insert_job_entity: InsertIngestionJobEntity) -> Result<Uuid>;

    async fn find_job_by_id(&self, job_id: Uuid) -> Result<Option<IngestionJobEntity>>;

    async fn list_jobs_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<IngestionJobEntity>>;

    /// Atomically moves up to `limit` queued jobs to `processing` and returns them.
    /// A job is returned to at most one caller.
    async fn claim_queued_jobs(
        &self,
        limit: i64,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<IngestionJobEntity>>;

    /// Sets `claimed_at` on the listed jobs that are still `processing` and returns their ids.
    /// A job missing from the result has already left `processing`.
    async fn renew_job_claims(
        &self,
        job_ids: Vec<Uuid>,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<Uuid>>;

    /// `processing -> completed`. Returns false when the job was not in `processing`.
    async fn mark_job_completed(&self, job_id: Uuid, executed_at: DateTime<Utc>) -> Result<bool>;

    /// `processing -> failed`. Returns false when the job was not in `processing`.
    async fn mark_job_failed(
        &self,
        job_id: Uuid,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Fails every `processing` job claimed before `claimed_before`.
    async fn fail_stale_processing_jobs(
        &self,
        claimed_before: DateTime<Utc>,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<usize>;
}

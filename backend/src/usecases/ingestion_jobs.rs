use chrono::Utc;
use crates::domain::{
    entities::ingestion_jobs::InsertIngestionJobEntity,
    repositories::ingestion_jobs::IngestionJobRepository,
    value_objects::{
        enums::{job_statuses::JobStatus, platforms::Platform},
        ingestion_jobs::{EnqueueJobModel, JobView},
    },
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::errors::{UseCaseError, UseCaseResult};

pub const DEFAULT_JOB_LIST_LIMIT: i64 = 20;
pub const MAX_JOB_LIST_LIMIT: i64 = 100;

/// Job Queue. Accepting a job is one store write; running it belongs to the worker.
pub struct IngestionJobUseCase<R>
where
    R: IngestionJobRepository + Send + Sync,
{
    ingestion_job_repository: Arc<R>,
}

impl<R> IngestionJobUseCase<R>
where
    R: IngestionJobRepository + Send + Sync,
{
    pub fn new(ingestion_job_repository: Arc<R>) -> Self {
        Self {
            ingestion_job_repository,
        }
    }

    pub async fn enqueue(&self, owner_id: Uuid, model: EnqueueJobModel) -> UseCaseResult<Uuid> {
        let platform: Platform = model.platform.parse().map_err(|err| {
            warn!(%owner_id, platform = %model.platform, "ingestion_jobs: unknown platform");
            UseCaseError::Validation(format!("{err}"))
        })?;

        let payload = model.payload.unwrap_or_else(|| Value::Object(Map::new()));

        let insert_entity = InsertIngestionJobEntity {
            id: Uuid::new_v4(),
            owner_id,
            platform: platform.to_string(),
            payload,
            status: JobStatus::Queued.to_string(),
            created_at: Utc::now(),
        };

        let job_id = self
            .ingestion_job_repository
            .insert_job(insert_entity)
            .await
            .map_err(|err| {
                error!(%owner_id, %platform, db_error = ?err, "ingestion_jobs: failed to insert job");
                err
            })?;

        info!(%owner_id, %job_id, %platform, "ingestion_jobs: job queued");
        Ok(job_id)
    }

    /// Only the job's owner may see it.
    pub async fn get_status(&self, job_id: Uuid, requester_id: Uuid) -> UseCaseResult<JobView> {
        let job = self
            .ingestion_job_repository
            .find_job_by_id(job_id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound("Job".to_string()))?;

        if job.owner_id != requester_id {
            warn!(%job_id, %requester_id, "ingestion_jobs: status requested by non-owner");
            return Err(UseCaseError::Forbidden);
        }

        Ok(JobView::from(job))
    }

    pub async fn list_jobs(&self, owner_id: Uuid, limit: Option<i64>) -> UseCaseResult<Vec<JobView>> {
        let limit = limit
            .unwrap_or(DEFAULT_JOB_LIST_LIMIT)
            .clamp(1, MAX_JOB_LIST_LIMIT);

        let jobs = self
            .ingestion_job_repository
            .list_jobs_by_owner(owner_id, limit)
            .await?;

        Ok(jobs.into_iter().map(JobView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::ingestion_jobs::IngestionJobEntity,
        repositories::ingestion_jobs::MockIngestionJobRepository,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    fn queued_job(id: Uuid, owner_id: Uuid) -> IngestionJobEntity {
        IngestionJobEntity {
            id,
            owner_id,
            platform: "gumroad".to_string(),
            payload: json!({}),
            status: JobStatus::Queued.to_string(),
            created_at: Utc::now(),
            claimed_at: None,
            executed_at: None,
            error_message: None,
        }
    }

    #[tokio::test]
    async fn enqueue_writes_a_queued_job() {
        let owner_id = Uuid::new_v4();
        let mut repo = MockIngestionJobRepository::new();

        repo.expect_insert_job()
            .withf(move |entity| {
                entity.owner_id == owner_id
                    && entity.platform == "amazon_kdp"
                    && entity.status == "queued"
                    && entity.payload == json!({"asin": "B0TEST"})
            })
            .times(1)
            .returning(|entity| Box::pin(async move { Ok(entity.id) }));

        let usecase = IngestionJobUseCase::new(Arc::new(repo));
        let result = usecase
            .enqueue(
                owner_id,
                EnqueueJobModel {
                    platform: "Amazon_KDP".to_string(),
                    payload: Some(json!({"asin": "B0TEST"})),
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn enqueue_rejects_unknown_platform_without_writing() {
        let mut repo = MockIngestionJobRepository::new();
        repo.expect_insert_job().never();

        let usecase = IngestionJobUseCase::new(Arc::new(repo));
        let result = usecase
            .enqueue(
                Uuid::new_v4(),
                EnqueueJobModel {
                    platform: "myspace".to_string(),
                    payload: None,
                },
            )
            .await;

        assert!(matches!(result, Err(UseCaseError::Validation(_))));
    }

    #[tokio::test]
    async fn get_status_is_forbidden_for_other_owners() {
        let job_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let job = queued_job(job_id, owner_id);

        let mut repo = MockIngestionJobRepository::new();
        repo.expect_find_job_by_id()
            .with(eq(job_id))
            .returning(move |_| {
                let job = job.clone();
                Box::pin(async move { Ok(Some(job)) })
            });

        let usecase = IngestionJobUseCase::new(Arc::new(repo));

        let result = usecase.get_status(job_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(UseCaseError::Forbidden)));

        let view = usecase.get_status(job_id, owner_id).await.unwrap();
        assert_eq!(view.status, "queued");
        assert!(view.executed_at.is_none());
    }

    #[tokio::test]
    async fn get_status_reports_missing_job() {
        let mut repo = MockIngestionJobRepository::new();
        repo.expect_find_job_by_id()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let usecase = IngestionJobUseCase::new(Arc::new(repo));
        let result = usecase.get_status(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(UseCaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn storage_failure_is_internal() {
        let mut repo = MockIngestionJobRepository::new();
        repo.expect_find_job_by_id()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("connection refused")) }));

        let usecase = IngestionJobUseCase::new(Arc::new(repo));
        let result = usecase.get_status(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(UseCaseError::Internal(_))));
    }

    #[tokio::test]
    async fn list_jobs_clamps_limit() {
        let owner_id = Uuid::new_v4();
        let mut repo = MockIngestionJobRepository::new();
        repo.expect_list_jobs_by_owner()
            .with(eq(owner_id), eq(MAX_JOB_LIST_LIMIT))
            .returning(|_, _| Box::pin(async move { Ok(Vec::new()) }));

        let usecase = IngestionJobUseCase::new(Arc::new(repo));
        let jobs = usecase.list_jobs(owner_id, Some(5_000)).await.unwrap();

        assert!(jobs.is_empty());
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::ingestion_jobs::{IngestionJobEntity, InsertIngestionJobEntity},
        repositories::ingestion_jobs::IngestionJobRepository,
        value_objects::enums::job_statuses::JobStatus,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::ingestion_jobs},
};

pub struct IngestionJobPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl IngestionJobPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl IngestionJobRepository for IngestionJobPostgres {
    async fn insert_job(&self, insert_job_entity: InsertIngestionJobEntity) -> Result<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let job_id = insert_into(ingestion_jobs::table)
                .values(&insert_job_entity)
                .returning(ingestion_jobs::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(job_id)
        })
        .await?
    }

    async fn find_job_by_id(&self, job_id: Uuid) -> Result<Option<IngestionJobEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<IngestionJobEntity>> {
            let mut conn = db_pool.get()?;

            let job = ingestion_jobs::table
                .find(job_id)
                .select(IngestionJobEntity::as_select())
                .first::<IngestionJobEntity>(&mut conn)
                .optional()?;

            Ok(job)
        })
        .await?
    }

    async fn list_jobs_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<IngestionJobEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<IngestionJobEntity>> {
            let mut conn = db_pool.get()?;

            let jobs = ingestion_jobs::table
                .filter(ingestion_jobs::owner_id.eq(owner_id))
                .order((ingestion_jobs::created_at.desc(), ingestion_jobs::id.desc()))
                .limit(limit)
                .select(IngestionJobEntity::as_select())
                .load::<IngestionJobEntity>(&mut conn)?;

            Ok(jobs)
        })
        .await?
    }

    async fn claim_queued_jobs(
        &self,
        limit: i64,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<IngestionJobEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<IngestionJobEntity>> {
            let mut conn = db_pool.get()?;

            // Rows locked by a concurrent claim are skipped; the status guard keeps the claim exclusive.
            let claimed = conn.transaction::<Vec<IngestionJobEntity>, diesel::result::Error, _>(
                |conn| {
                    let candidate_ids = ingestion_jobs::table
                        .filter(ingestion_jobs::status.eq(JobStatus::Queued.to_string()))
                        .order((ingestion_jobs::created_at.asc(), ingestion_jobs::id.asc()))
                        .limit(limit)
                        .select(ingestion_jobs::id)
                        .for_update()
                        .skip_locked()
                        .load::<Uuid>(conn)?;

                    if candidate_ids.is_empty() {
                        return Ok(Vec::new());
                    }

                    update(
                        ingestion_jobs::table
                            .filter(ingestion_jobs::id.eq_any(candidate_ids))
                            .filter(ingestion_jobs::status.eq(JobStatus::Queued.to_string())),
                    )
                    .set((
                        ingestion_jobs::status.eq(JobStatus::Processing.to_string()),
                        ingestion_jobs::claimed_at.eq(Some(claimed_at)),
                    ))
                    .returning(IngestionJobEntity::as_select())
                    .get_results::<IngestionJobEntity>(conn)
                },
            )?;

            Ok(claimed)
        })
        .await?
    }

    async fn renew_job_claims(
        &self,
        job_ids: Vec<Uuid>,
        claimed_at: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let renewed = update(
                ingestion_jobs::table
                    .filter(ingestion_jobs::id.eq_any(job_ids))
                    .filter(ingestion_jobs::status.eq(JobStatus::Processing.to_string())),
            )
            .set(ingestion_jobs::claimed_at.eq(Some(claimed_at)))
            .returning(ingestion_jobs::id)
            .get_results::<Uuid>(&mut conn)?;

            Ok(renewed)
        })
        .await?
    }

    async fn mark_job_completed(&self, job_id: Uuid, executed_at: DateTime<Utc>) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let updated = update(
                ingestion_jobs::table
                    .filter(ingestion_jobs::id.eq(job_id))
                    .filter(ingestion_jobs::status.eq(JobStatus::Processing.to_string())),
            )
            .set((
                ingestion_jobs::status.eq(JobStatus::Completed.to_string()),
                ingestion_jobs::executed_at.eq(Some(executed_at)),
                ingestion_jobs::error_message.eq::<Option<String>>(None),
            ))
            .execute(&mut conn)?;

            Ok(updated == 1)
        })
        .await?
    }

    async fn mark_job_failed(
        &self,
        job_id: Uuid,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let updated = update(
                ingestion_jobs::table
                    .filter(ingestion_jobs::id.eq(job_id))
                    .filter(ingestion_jobs::status.eq(JobStatus::Processing.to_string())),
            )
            .set((
                ingestion_jobs::status.eq(JobStatus::Failed.to_string()),
                ingestion_jobs::executed_at.eq(Some(executed_at)),
                ingestion_jobs::error_message.eq(Some(error_message)),
            ))
            .execute(&mut conn)?;

            Ok(updated == 1)
        })
        .await?
    }

    async fn fail_stale_processing_jobs(
        &self,
        claimed_before: DateTime<Utc>,
        error_message: String,
        executed_at: DateTime<Utc>,
    ) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let updated = update(
                ingestion_jobs::table
                    .filter(ingestion_jobs::status.eq(JobStatus::Processing.to_string()))
                    .filter(ingestion_jobs::claimed_at.lt(claimed_before)),
            )
            .set((
                ingestion_jobs::status.eq(JobStatus::Failed.to_string()),
                ingestion_jobs::executed_at.eq(Some(executed_at)),
                ingestion_jobs::error_message.eq(Some(error_message)),
            ))
            .execute(&mut conn)?;

            Ok(updated)
        })
        .await?
    }
}

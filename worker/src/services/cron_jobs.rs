use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use crate::{
    config::config_loader::MAX_BATCH_LIMIT,
    usecases::{
        cron_runs::CronRunRecorder,
        ingestion_batch::{IngestionBatchResult, IngestionBatchUseCase},
        leaderboard_recompute::{LeaderboardRecomputeUseCase, SlugOutcome},
        promotion_sweep::{PromotionSweepResult, PromotionSweepUseCase},
    },
};

pub const INGESTION_JOB_NAME: &str = "process-ingestion-jobs";
pub const LEADERBOARDS_JOB_NAME: &str = "calculate-leaderboards";
pub const PROMOTIONS_JOB_NAME: &str = "promotion-sweep";

/// The scheduled entry points, each bracketed by cron audit entries.
/// Shared by the HTTP triggers and the in-process scheduler.
pub struct CronJobs {
    recorder: CronRunRecorder,
    ingestion: IngestionBatchUseCase,
    leaderboards: LeaderboardRecomputeUseCase,
    promotions: PromotionSweepUseCase,
    batch_limit: i64,
    leaderboard_slugs: Vec<String>,
}

impl CronJobs {
    pub fn new(
        recorder: CronRunRecorder,
        ingestion: IngestionBatchUseCase,
        leaderboards: LeaderboardRecomputeUseCase,
        promotions: PromotionSweepUseCase,
        batch_limit: i64,
        leaderboard_slugs: Vec<String>,
    ) -> Self {
        Self {
            recorder,
            ingestion,
            leaderboards,
            promotions,
            batch_limit,
            leaderboard_slugs,
        }
    }

    pub async fn run_ingestion(&self, limit: Option<i64>) -> Result<IngestionBatchResult> {
        let limit = limit
            .unwrap_or(self.batch_limit)
            .clamp(1, MAX_BATCH_LIMIT);

        self.recorder.started(INGESTION_JOB_NAME).await;
        match self.ingestion.process_batch(limit).await {
            Ok(result) => {
                self.recorder.completed(INGESTION_JOB_NAME, &result).await;
                Ok(result)
            }
            Err(err) => {
                self.recorder
                    .failed(INGESTION_JOB_NAME, json!({ "limit": limit }), &err)
                    .await;
                Err(err)
            }
        }
    }

    /// Per-slug failures are part of the outcome; the run itself always completes.
    pub async fn run_leaderboards(&self) -> Vec<SlugOutcome> {
        self.recorder.started(LEADERBOARDS_JOB_NAME).await;
        let results = self
            .leaderboards
            .recalculate_all(&self.leaderboard_slugs)
            .await;
        self.recorder
            .completed(LEADERBOARDS_JOB_NAME, &json!({ "results": results }))
            .await;
        results
    }

    /// Both steps always run; the invocation fails if either of them failed.
    pub async fn run_promotions(&self) -> Result<PromotionSweepResult> {
        self.recorder.started(PROMOTIONS_JOB_NAME).await;
        let result = self.promotions.run_sweep().await;

        if !result.errors.is_empty() {
            let err = anyhow::anyhow!(result.errors.join("; "));
            self.recorder
                .failed(
                    PROMOTIONS_JOB_NAME,
                    json!({
                        "boosts": result.boosts,
                        "expiredBadges": result.expired_badges,
                    }),
                    &err,
                )
                .await;
            return Err(err);
        }

        self.recorder.completed(PROMOTIONS_JOB_NAME, &result).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::ingestion_batch::IngestionBatchSettings;
    use chrono::{FixedOffset, Utc};
    use crates::{
        domain::{
            entities::ingestion_jobs::InsertIngestionJobEntity,
            repositories::{
                ingestion_jobs::{IngestionJobRepository, MockIngestionJobRepository},
                leaderboards::MockLeaderboardScoreSource,
                platform_sync::MockPlatformSync,
                promotions::MockPromotionRepository,
            },
            value_objects::enums::job_statuses::JobStatus,
        },
        infra::memory::MemoryStore,
    };
    use std::time::Duration;
    use uuid::Uuid;

    fn settings() -> IngestionBatchSettings {
        IngestionBatchSettings {
            job_timeout: Duration::from_secs(5),
            stale_after: chrono::Duration::minutes(30),
        }
    }

    fn cron_jobs(
        store: &MemoryStore,
        job_repository: Arc<dyn IngestionJobRepository + Send + Sync>,
        platform_sync: MockPlatformSync,
        promotions: MockPromotionRepository,
    ) -> CronJobs {
        let mut source = MockLeaderboardScoreSource::new();
        source
            .expect_fetch_scores()
            .returning(|_, _| Box::pin(async move { Ok(vec![]) }));

        CronJobs::new(
            CronRunRecorder::new(Arc::new(store.clone())),
            IngestionBatchUseCase::new(job_repository, Arc::new(platform_sync), settings()),
            LeaderboardRecomputeUseCase::new(
                Arc::new(source),
                Arc::new(store.clone()),
                FixedOffset::east_opt(0).unwrap(),
            ),
            PromotionSweepUseCase::new(Arc::new(promotions)),
            10,
            vec!["weekly-authors-overall".to_string(), "bogus".to_string()],
        )
    }

    #[tokio::test]
    async fn ingestion_run_is_bracketed_by_audit_entries() {
        let store = MemoryStore::new();
        store
            .insert_job(InsertIngestionJobEntity {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                platform: "kobo".to_string(),
                payload: serde_json::json!({}),
                status: JobStatus::Queued.to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let mut sync = MockPlatformSync::new();
        sync.expect_sync()
            .returning(|_| Box::pin(async move { Ok(()) }));

        let jobs = cron_jobs(
            &store,
            Arc::new(store.clone()),
            sync,
            MockPromotionRepository::new(),
        );
        let result = jobs.run_ingestion(None).await.unwrap();
        assert_eq!(result.processed, 1);

        let audit = store.cron_executions();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].job_name, INGESTION_JOB_NAME);
        assert_eq!(audit[0].status, "started");
        assert_eq!(audit[1].status, "completed");
        assert_eq!(audit[1].metadata["processed"], 1);
    }

    #[tokio::test]
    async fn storage_failure_is_audited_as_failed() {
        let store = MemoryStore::new();
        let mut repo = MockIngestionJobRepository::new();
        repo.expect_fail_stale_processing_jobs()
            .returning(|_, _, _| Box::pin(async move { Err(anyhow::anyhow!("pool timed out")) }));

        let jobs = cron_jobs(
            &store,
            Arc::new(repo),
            MockPlatformSync::new(),
            MockPromotionRepository::new(),
        );
        assert!(jobs.run_ingestion(Some(500)).await.is_err());

        let audit = store.cron_executions();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[1].status, "failed");
        assert_eq!(audit[1].error.as_deref(), Some("pool timed out"));
        assert_eq!(audit[1].metadata["limit"], MAX_BATCH_LIMIT);
    }

    #[tokio::test]
    async fn leaderboard_run_reports_each_slug() {
        let store = MemoryStore::new();
        let jobs = cron_jobs(
            &store,
            Arc::new(store.clone()),
            MockPlatformSync::new(),
            MockPromotionRepository::new(),
        );

        let results = jobs.run_leaderboards().await;
        assert_eq!(results[0].status, "ok");
        assert_eq!(results[1].status, "error");

        let audit = store.cron_executions();
        assert_eq!(audit[1].status, "completed");
        assert_eq!(audit[1].metadata["results"][1]["slug"], "bogus");
    }

    #[tokio::test]
    async fn promotion_run_fails_when_every_step_fails() {
        let store = MemoryStore::new();
        let mut promotions = MockPromotionRepository::new();
        promotions
            .expect_activate_due_boosts()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("boosts unavailable")) }));
        promotions
            .expect_expire_badges()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("badges unavailable")) }));

        let jobs = cron_jobs(
            &store,
            Arc::new(store.clone()),
            MockPlatformSync::new(),
            promotions,
        );
        assert!(jobs.run_promotions().await.is_err());

        let audit = store.cron_executions();
        assert_eq!(audit[1].status, "failed");
        assert!(audit[1].error.as_deref().unwrap().contains("badges unavailable"));
    }

    #[tokio::test]
    async fn promotion_run_fails_when_boost_step_fails_alone() {
        let store = MemoryStore::new();
        let mut promotions = MockPromotionRepository::new();
        promotions
            .expect_activate_due_boosts()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("boosts unavailable")) }));
        promotions
            .expect_expire_badges()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(0) }));

        let jobs = cron_jobs(
            &store,
            Arc::new(store.clone()),
            MockPlatformSync::new(),
            promotions,
        );
        assert!(jobs.run_promotions().await.is_err());

        let audit = store.cron_executions();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[1].job_name, PROMOTIONS_JOB_NAME);
        assert_eq!(audit[1].status, "failed");
        assert_eq!(
            audit[1].error.as_deref(),
            Some("boosts: boosts unavailable")
        );
        assert_eq!(audit[1].metadata["expiredBadges"], 0);
    }
}

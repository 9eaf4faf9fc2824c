use chrono::Utc;
use crates::domain::{
    entities::cron_executions::InsertCronExecutionEntity,
    repositories::cron_audit::CronAuditRepository,
    value_objects::enums::cron_statuses::CronStatus,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, warn};

/// Writes the cron audit log. A failed audit write is logged and never fails the run itself.
pub struct CronRunRecorder {
    repository: Arc<dyn CronAuditRepository + Send + Sync>,
}

impl CronRunRecorder {
    pub fn new(repository: Arc<dyn CronAuditRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    pub async fn started(&self, job_name: &str) {
        self.record(job_name, CronStatus::Started, json!({}), None)
            .await;
    }

    pub async fn completed<M: Serialize>(&self, job_name: &str, metadata: &M) {
        let metadata = serde_json::to_value(metadata).unwrap_or_else(|err| {
            warn!(job_name, error = ?err, "cron_runs: metadata is not serializable");
            json!({})
        });
        self.record(job_name, CronStatus::Completed, metadata, None)
            .await;
    }

    pub async fn failed(&self, job_name: &str, metadata: Value, error: &anyhow::Error) {
        self.record(
            job_name,
            CronStatus::Failed,
            metadata,
            Some(format!("{error:#}")),
        )
        .await;
    }

    async fn record(&self, job_name: &str, status: CronStatus, metadata: Value, error: Option<String>) {
        let insert_entity = InsertCronExecutionEntity {
            job_name: job_name.to_string(),
            status: status.to_string(),
            metadata,
            error,
            created_at: Utc::now(),
        };

        if let Err(err) = self.repository.record_execution(insert_entity).await {
            error!(job_name, %status, error = ?err, "cron_runs: failed to write audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::cron_audit::MockCronAuditRepository;
    use uuid::Uuid;

    #[tokio::test]
    async fn audit_write_failure_is_swallowed() {
        let mut repo = MockCronAuditRepository::new();
        repo.expect_record_execution()
            .times(1)
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("db down")) }));

        let recorder = CronRunRecorder::new(Arc::new(repo));
        recorder.started("process-ingestion-jobs").await;
    }

    #[tokio::test]
    async fn failure_entry_carries_error_summary() {
        let mut repo = MockCronAuditRepository::new();
        repo.expect_record_execution()
            .withf(|entity| {
                entity.status == "failed"
                    && entity.job_name == "promotion-sweep"
                    && entity.error.as_deref() == Some("claim failed: connection reset")
            })
            .times(1)
            .returning(|_| Box::pin(async move { Ok(Uuid::new_v4()) }));

        let recorder = CronRunRecorder::new(Arc::new(repo));
        let error = anyhow::anyhow!("connection reset").context("claim failed");
        recorder.failed("promotion-sweep", json!({}), &error).await;
    }
}

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{
    entities::cron_executions::{CronExecutionEntity, InsertCronExecutionEntity},
    repositories::cron_audit::CronAuditRepository,
};

#[async_trait]
impl CronAuditRepository for MemoryStore {
    async fn record_execution(&self, insert_entity: InsertCronExecutionEntity) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.tables()?.cron_executions.push(CronExecutionEntity {
            id,
            job_name: insert_entity.job_name,
            status: insert_entity.status,
            metadata: insert_entity.metadata,
            error: insert_entity.error,
            created_at: insert_entity.created_at,
        });
        Ok(id)
    }
}

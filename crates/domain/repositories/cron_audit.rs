use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::cron_executions::InsertCronExecutionEntity;

#[async_trait]
#[automock]
pub trait CronAuditRepository {
    async fn record_execution(&self, insert_entity: InsertCronExecutionEntity) -> Result<Uuid>;
}

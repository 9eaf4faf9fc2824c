use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::cron_executions::InsertCronExecutionEntity,
        repositories::cron_audit::CronAuditRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::cron_executions},
};

pub struct CronAuditPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CronAuditPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CronAuditRepository for CronAuditPostgres {
    async fn record_execution(&self, insert_entity: InsertCronExecutionEntity) -> Result<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let id = insert_into(cron_executions::table)
                .values(&insert_entity)
                .returning(cron_executions::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(id)
        })
        .await?
    }
}

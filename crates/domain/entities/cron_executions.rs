use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::cron_executions;

/// Append-only; rows are never updated after insert.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cron_executions)]
pub struct CronExecutionEntity {
    pub id: Uuid,
    pub job_name: String,
    pub status: String,
    pub metadata: Value,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cron_executions)]
pub struct InsertCronExecutionEntity {
    pub job_name: String,
    pub status: String,
    pub metadata: Value,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

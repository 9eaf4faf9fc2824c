use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::ingestion_jobs;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = ingestion_jobs)]
pub struct IngestionJobEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub platform: String,
    pub payload: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ingestion_jobs)]
pub struct InsertIngestionJobEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub platform: String,
    pub payload: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

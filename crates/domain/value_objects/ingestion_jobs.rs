use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    entities::ingestion_jobs::IngestionJobEntity, value_objects::enums::platforms::Platform,
};

/// The externally visible part of a job, as returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: Uuid,
    pub platform: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl From<IngestionJobEntity> for JobView {
    fn from(value: IngestionJobEntity) -> Self {
        Self {
            id: value.id,
            platform: value.platform,
            status: value.status,
            created_at: value.created_at,
            executed_at: value.executed_at,
            error_message: value.error_message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueJobModel {
    pub platform: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Everything a platform connector needs to run one sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub job_id: Uuid,
    pub owner_id: Uuid,
    pub platform: Platform,
    pub payload: Value,
}

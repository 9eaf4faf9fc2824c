use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::credits::CreditTransactionEntity;

pub const DAILY_LOGIN_REASON: &str = "daily_login";
pub const BOOST_PURCHASE_REASON: &str = "boost_purchase";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransactionDto {
    pub id: Uuid,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreditTransactionEntity> for CreditTransactionDto {
    fn from(value: CreditTransactionEntity) -> Self {
        Self {
            id: value.id,
            delta: value.delta,
            reason: value.reason,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAwardDto {
    pub awarded: i64,
    pub balance: i64,
}

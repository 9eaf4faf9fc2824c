use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::promotions::{BadgeEntity, BoostEntity};

/// Outcome of a conditional credit debit for a boost.
#[derive(Debug, Clone, PartialEq)]
pub enum BoostPurchase {
    Purchased(BoostEntity),
    InsufficientBalance { balance: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBoostModel {
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoostDto {
    pub id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<BoostEntity> for BoostDto {
    fn from(value: BoostEntity) -> Self {
        Self {
            id: value.id,
            scheduled_start: value.scheduled_start,
            scheduled_end: value.scheduled_end,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDto {
    pub id: Uuid,
    pub badge_type: String,
    pub awarded_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<BadgeEntity> for BadgeDto {
    fn from(value: BadgeEntity) -> Self {
        Self {
            id: value.id,
            badge_type: value.badge_type,
            awarded_at: value.awarded_at,
            expires_at: value.expires_at,
        }
    }
}

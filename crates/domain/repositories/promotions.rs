use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::promotions::{BadgeEntity, BoostEntity};

#[async_trait]
#[automock]
pub trait PromotionRepository {
    /// `scheduled -> active` for boosts whose start has been reached.
    async fn activate_due_boosts(&self, now: DateTime<Utc>) -> Result<usize>;

    /// `active -> completed` for boosts whose end has passed.
    async fn complete_ended_boosts(&self, now: DateTime<Utc>) -> Result<usize>;

    async fn list_boosts_by_owner(&self, owner_id: Uuid) -> Result<Vec<BoostEntity>>;

    async fn expire_badges(&self, now: DateTime<Utc>) -> Result<usize>;

    async fn list_active_badges(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<BadgeEntity>>;
}

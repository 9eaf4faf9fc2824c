use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{
    entities::promotions::{BadgeEntity, BoostEntity},
    repositories::promotions::PromotionRepository,
    value_objects::enums::boost_statuses::BoostStatus,
};

impl MemoryStore {
    fn move_boosts(
        &self,
        from: BoostStatus,
        to: BoostStatus,
        due: impl Fn(&BoostEntity) -> bool,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut tables = self.tables()?;
        let mut moved = 0;

        for boost in tables.boosts.values_mut() {
            if BoostStatus::from_str(&boost.status) == Some(from) && due(boost) {
                boost.status = to.to_string();
                boost.updated_at = now;
                moved += 1;
            }
        }

        Ok(moved)
    }
}

#[async_trait]
impl PromotionRepository for MemoryStore {
    async fn activate_due_boosts(&self, now: DateTime<Utc>) -> Result<usize> {
        self.move_boosts(
            BoostStatus::Scheduled,
            BoostStatus::Active,
            |boost| boost.scheduled_start <= now,
            now,
        )
    }

    async fn complete_ended_boosts(&self, now: DateTime<Utc>) -> Result<usize> {
        self.move_boosts(
            BoostStatus::Active,
            BoostStatus::Completed,
            |boost| boost.scheduled_end <= now,
            now,
        )
    }

    async fn list_boosts_by_owner(&self, owner_id: Uuid) -> Result<Vec<BoostEntity>> {
        let tables = self.tables()?;
        let mut boosts: Vec<BoostEntity> = tables
            .boosts
            .values()
            .filter(|boost| boost.owner_id == owner_id)
            .cloned()
            .collect();
        boosts.sort_by(|a, b| b.scheduled_start.cmp(&a.scheduled_start));
        Ok(boosts)
    }

    async fn expire_badges(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut tables = self.tables()?;
        let mut expired = 0;

        for badge in tables.badges.values_mut() {
            if badge.active && badge.expires_at.is_some_and(|at| at <= now) {
                badge.active = false;
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn list_active_badges(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<BadgeEntity>> {
        let tables = self.tables()?;
        let mut badges: Vec<BadgeEntity> = tables
            .badges
            .values()
            .filter(|badge| badge.owner_id == owner_id && badge.active)
            .filter(|badge| badge.expires_at.is_none_or(|at| at > now))
            .cloned()
            .collect();
        badges.sort_by(|a, b| b.awarded_at.cmp(&a.awarded_at));
        Ok(badges)
    }
}

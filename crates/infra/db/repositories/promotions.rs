use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::promotions::{BadgeEntity, BoostEntity},
        repositories::promotions::PromotionRepository,
        value_objects::enums::boost_statuses::BoostStatus,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{badges, boosts},
    },
};

pub struct PromotionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PromotionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PromotionRepository for PromotionPostgres {
    async fn activate_due_boosts(&self, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let updated = update(
                boosts::table
                    .filter(boosts::status.eq(BoostStatus::Scheduled.to_string()))
                    .filter(boosts::scheduled_start.le(now)),
            )
            .set((
                boosts::status.eq(BoostStatus::Active.to_string()),
                boosts::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(updated)
        })
        .await?
    }

    async fn complete_ended_boosts(&self, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let updated = update(
                boosts::table
                    .filter(boosts::status.eq(BoostStatus::Active.to_string()))
                    .filter(boosts::scheduled_end.le(now)),
            )
            .set((
                boosts::status.eq(BoostStatus::Completed.to_string()),
                boosts::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(updated)
        })
        .await?
    }

    async fn list_boosts_by_owner(&self, owner_id: Uuid) -> Result<Vec<BoostEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<BoostEntity>> {
            let mut conn = db_pool.get()?;

            let result = boosts::table
                .filter(boosts::owner_id.eq(owner_id))
                .order(boosts::scheduled_start.desc())
                .select(BoostEntity::as_select())
                .load::<BoostEntity>(&mut conn)?;

            Ok(result)
        })
        .await?
    }

    async fn expire_badges(&self, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let updated = update(
                badges::table
                    .filter(badges::active.eq(true))
                    .filter(badges::expires_at.is_not_null())
                    .filter(badges::expires_at.le(now)),
            )
            .set(badges::active.eq(false))
            .execute(&mut conn)?;

            Ok(updated)
        })
        .await?
    }

    async fn list_active_badges(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<BadgeEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<BadgeEntity>> {
            let mut conn = db_pool.get()?;

            // Also hides badges past expiry that the next sweep has not flipped yet.
            let result = badges::table
                .filter(badges::owner_id.eq(owner_id))
                .filter(badges::active.eq(true))
                .filter(badges::expires_at.is_null().or(badges::expires_at.gt(now)))
                .order(badges::awarded_at.desc())
                .select(BadgeEntity::as_select())
                .load::<BadgeEntity>(&mut conn)?;

            Ok(result)
        })
        .await?
    }
}

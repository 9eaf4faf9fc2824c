use chrono::{DateTime, Utc};
use crates::domain::{
    entities::promotions::InsertBoostEntity,
    repositories::{credit_ledger::CreditLedgerRepository, promotions::PromotionRepository},
    value_objects::{
        enums::boost_statuses::BoostStatus,
        promotions::{BadgeDto, BoostDto, BoostPurchase, PurchaseBoostModel},
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{UseCaseError, UseCaseResult};

/// Boost purchase and the owner-facing boost and badge listings. Status changes after
/// purchase belong to the worker's promotion sweep.
pub struct PromotionUseCase<P, C>
where
    P: PromotionRepository + Send + Sync,
    C: CreditLedgerRepository + Send + Sync,
{
    promotion_repository: Arc<P>,
    credit_ledger_repository: Arc<C>,
    boost_cost_credits: i64,
}

impl<P, C> PromotionUseCase<P, C>
where
    P: PromotionRepository + Send + Sync,
    C: CreditLedgerRepository + Send + Sync,
{
    pub fn new(
        promotion_repository: Arc<P>,
        credit_ledger_repository: Arc<C>,
        boost_cost_credits: i64,
    ) -> Self {
        Self {
            promotion_repository,
            credit_ledger_repository,
            boost_cost_credits,
        }
    }

    pub async fn purchase_boost(
        &self,
        owner_id: Uuid,
        model: PurchaseBoostModel,
    ) -> UseCaseResult<BoostDto> {
        self.purchase_boost_at(owner_id, model, Utc::now()).await
    }

    pub async fn purchase_boost_at(
        &self,
        owner_id: Uuid,
        model: PurchaseBoostModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<BoostDto> {
        if model.scheduled_end <= model.scheduled_start {
            return Err(UseCaseError::Validation(
                "scheduledEnd must be after scheduledStart".to_string(),
            ));
        }
        if model.scheduled_end <= now {
            return Err(UseCaseError::Validation(
                "scheduledEnd must be in the future".to_string(),
            ));
        }

        let insert_entity = InsertBoostEntity {
            owner_id,
            scheduled_start: model.scheduled_start,
            scheduled_end: model.scheduled_end,
            status: BoostStatus::Scheduled.to_string(),
            created_at: now,
            updated_at: now,
        };

        match self
            .credit_ledger_repository
            .purchase_boost(insert_entity, self.boost_cost_credits)
            .await?
        {
            BoostPurchase::Purchased(boost) => {
                info!(%owner_id, boost_id = %boost.id, cost = self.boost_cost_credits, "promotions: boost purchased");
                Ok(BoostDto::from(boost))
            }
            BoostPurchase::InsufficientBalance { balance } => {
                warn!(%owner_id, balance, cost = self.boost_cost_credits, "promotions: insufficient credits for boost");
                Err(UseCaseError::InsufficientCredits {
                    balance,
                    required: self.boost_cost_credits,
                })
            }
        }
    }

    pub async fn list_boosts(&self, owner_id: Uuid) -> UseCaseResult<Vec<BoostDto>> {
        let boosts = self
            .promotion_repository
            .list_boosts_by_owner(owner_id)
            .await?;

        Ok(boosts.into_iter().map(BoostDto::from).collect())
    }

    /// Expired badges disappear here as soon as `expires_at` passes, even before the sweep flips them.
    pub async fn list_active_badges(&self, owner_id: Uuid) -> UseCaseResult<Vec<BadgeDto>> {
        let badges = self
            .promotion_repository
            .list_active_badges(owner_id, Utc::now())
            .await?;

        Ok(badges.into_iter().map(BadgeDto::from).collect())
    }
}

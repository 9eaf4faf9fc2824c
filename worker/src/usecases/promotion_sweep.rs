use anyhow::Result;
use chrono::{DateTime, Utc};
use crates::domain::repositories::promotions::PromotionRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostStatusUpdate {
    pub activated: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSweepResult {
    pub boosts: Option<BoostStatusUpdate>,
    pub expired_badges: Option<usize>,
    pub errors: Vec<String>,
}

pub struct PromotionSweepUseCase {
    promotion_repository: Arc<dyn PromotionRepository + Send + Sync>,
}

impl PromotionSweepUseCase {
    pub fn new(promotion_repository: Arc<dyn PromotionRepository + Send + Sync>) -> Self {
        Self {
            promotion_repository,
        }
    }

    pub async fn update_boost_statuses(&self) -> Result<BoostStatusUpdate> {
        self.update_boost_statuses_at(Utc::now()).await
    }

    /// Activation runs before completion, so a boost whose whole window already passed
    /// moves `scheduled -> active -> completed` in one sweep.
    pub async fn update_boost_statuses_at(&self, now: DateTime<Utc>) -> Result<BoostStatusUpdate> {
        let activated = self.promotion_repository.activate_due_boosts(now).await?;
        let completed = self.promotion_repository.complete_ended_boosts(now).await?;

        info!(activated, completed, "promotion_sweep: boost statuses updated");
        Ok(BoostStatusUpdate {
            activated,
            completed,
        })
    }

    pub async fn expire_old_badges(&self) -> Result<usize> {
        self.expire_old_badges_at(Utc::now()).await
    }

    pub async fn expire_old_badges_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.promotion_repository.expire_badges(now).await?;
        info!(expired, "promotion_sweep: badges expired");
        Ok(expired)
    }

    /// Boost and badge steps run independently; a failure in one is reported, not propagated.
    pub async fn run_sweep(&self) -> PromotionSweepResult {
        self.run_sweep_at(Utc::now()).await
    }

    pub async fn run_sweep_at(&self, now: DateTime<Utc>) -> PromotionSweepResult {
        let mut result = PromotionSweepResult::default();

        match self.update_boost_statuses_at(now).await {
            Ok(update) => result.boosts = Some(update),
            Err(err) => {
                error!(error = ?err, "promotion_sweep: boost status update failed");
                result.errors.push(format!("boosts: {err:#}"));
            }
        }

        match self.expire_old_badges_at(now).await {
            Ok(expired) => result.expired_badges = Some(expired),
            Err(err) => {
                error!(error = ?err, "promotion_sweep: badge expiry failed");
                result.errors.push(format!("badges: {err:#}"));
            }
        }

        result
    }
}

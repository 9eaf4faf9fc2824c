use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{credits::CreditTransactionEntity, promotions::InsertBoostEntity},
    value_objects::promotions::BoostPurchase,
};

/// Ledger Store. Balance changes and their ledger rows are written in one transaction.
#[async_trait]
#[automock]
pub trait CreditLedgerRepository {
    /// Credits `amount` unless the owner was already awarded on `today`.
    /// Returns the new balance, or `None` when today's award already happened.
    async fn award_daily_credits(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        amount: i64,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<i64>>;

    /// Zero for owners without an account row.
    async fn find_balance(&self, owner_id: Uuid) -> Result<i64>;

    /// Newest first.
    async fn list_transactions(
        &self,
        owner_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransactionEntity>>;

    /// Debits `cost` only if the balance covers it, then inserts the boost.
    async fn purchase_boost(
        &self,
        insert_boost_entity: InsertBoostEntity,
        cost: i64,
    ) -> Result<BoostPurchase>;
}

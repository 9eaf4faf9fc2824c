use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{MemoryStore, MemoryTables};
use crate::domain::{
    entities::{
        credits::{CreditAccountEntity, CreditTransactionEntity},
        promotions::{BoostEntity, InsertBoostEntity},
    },
    repositories::credit_ledger::CreditLedgerRepository,
    value_objects::{
        credits::{BOOST_PURCHASE_REASON, DAILY_LOGIN_REASON},
        promotions::BoostPurchase,
    },
};

fn account_mut(
    tables: &mut MemoryTables,
    owner_id: Uuid,
    now: DateTime<Utc>,
) -> &mut CreditAccountEntity {
    tables
        .credit_accounts
        .entry(owner_id)
        .or_insert_with(|| CreditAccountEntity {
            owner_id,
            balance: 0,
            last_daily_award_date: None,
            updated_at: now,
        })
}

fn append_transaction(
    tables: &mut MemoryTables,
    owner_id: Uuid,
    delta: i64,
    reason: &str,
    created_at: DateTime<Utc>,
) {
    tables.credit_transactions.push(CreditTransactionEntity {
        id: Uuid::new_v4(),
        owner_id,
        delta,
        reason: reason.to_string(),
        created_at,
    });
}

#[async_trait]
impl CreditLedgerRepository for MemoryStore {
    async fn award_daily_credits(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        amount: i64,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let mut tables = self.tables()?;

        let account = account_mut(&mut tables, owner_id, awarded_at);
        if account.last_daily_award_date == Some(today) {
            return Ok(None);
        }
        account.balance += amount;
        account.last_daily_award_date = Some(today);
        account.updated_at = awarded_at;
        let balance = account.balance;

        append_transaction(&mut tables, owner_id, amount, DAILY_LOGIN_REASON, awarded_at);
        Ok(Some(balance))
    }

    async fn find_balance(&self, owner_id: Uuid) -> Result<i64> {
        Ok(self
            .tables()?
            .credit_accounts
            .get(&owner_id)
            .map(|account| account.balance)
            .unwrap_or(0))
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransactionEntity>> {
        let tables = self.tables()?;

        // Insertion order breaks ties between rows written in the same instant.
        let mut transactions: Vec<(usize, &CreditTransactionEntity)> = tables
            .credit_transactions
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.owner_id == owner_id)
            .collect();
        transactions.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        Ok(transactions
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(_, tx)| tx.clone())
            .collect())
    }

    async fn purchase_boost(
        &self,
        insert_boost_entity: InsertBoostEntity,
        cost: i64,
    ) -> Result<BoostPurchase> {
        let mut tables = self.tables()?;
        let owner_id = insert_boost_entity.owner_id;
        let now = insert_boost_entity.created_at;

        let account = account_mut(&mut tables, owner_id, now);
        if account.balance < cost {
            return Ok(BoostPurchase::InsufficientBalance {
                balance: account.balance,
            });
        }
        account.balance -= cost;
        account.updated_at = now;

        append_transaction(&mut tables, owner_id, -cost, BOOST_PURCHASE_REASON, now);

        let boost = BoostEntity {
            id: Uuid::new_v4(),
            owner_id,
            scheduled_start: insert_boost_entity.scheduled_start,
            scheduled_end: insert_boost_entity.scheduled_end,
            status: insert_boost_entity.status,
            created_at: insert_boost_entity.created_at,
            updated_at: insert_boost_entity.updated_at,
        };
        tables.boosts.insert(boost.id, boost.clone());

        Ok(BoostPurchase::Purchased(boost))
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            credits::{CreditTransactionEntity, InsertCreditTransactionEntity},
            promotions::{BoostEntity, InsertBoostEntity},
        },
        repositories::credit_ledger::CreditLedgerRepository,
        value_objects::{
            credits::{BOOST_PURCHASE_REASON, DAILY_LOGIN_REASON},
            promotions::BoostPurchase,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{boosts, credit_accounts, credit_transactions},
    },
};

pub struct CreditLedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CreditLedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn ensure_account(conn: &mut PgConnection, owner_id: Uuid, now: DateTime<Utc>) -> QueryResult<usize> {
    insert_into(credit_accounts::table)
        .values((
            credit_accounts::owner_id.eq(owner_id),
            credit_accounts::balance.eq(0_i64),
            credit_accounts::updated_at.eq(now),
        ))
        .on_conflict(credit_accounts::owner_id)
        .do_nothing()
        .execute(conn)
}

#[async_trait]
impl CreditLedgerRepository for CreditLedgerPostgres {
    async fn award_daily_credits(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        amount: i64,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<i64>> {
            let mut conn = db_pool.get()?;

            let new_balance = conn.transaction::<Option<i64>, diesel::result::Error, _>(|conn| {
                ensure_account(conn, owner_id, awarded_at)?;

                // The date guard and the balance bump are one statement; a concurrent award
                // for the same day matches zero rows.
                let new_balance = update(
                    credit_accounts::table
                        .filter(credit_accounts::owner_id.eq(owner_id))
                        .filter(credit_accounts::last_daily_award_date.is_distinct_from(today)),
                )
                .set((
                    credit_accounts::balance.eq(credit_accounts::balance + amount),
                    credit_accounts::last_daily_award_date.eq(Some(today)),
                    credit_accounts::updated_at.eq(awarded_at),
                ))
                .returning(credit_accounts::balance)
                .get_result::<i64>(conn)
                .optional()?;

                if new_balance.is_some() {
                    insert_into(credit_transactions::table)
                        .values(&InsertCreditTransactionEntity {
                            owner_id,
                            delta: amount,
                            reason: DAILY_LOGIN_REASON.to_string(),
                            created_at: awarded_at,
                        })
                        .execute(conn)?;
                }

                Ok(new_balance)
            })?;

            Ok(new_balance)
        })
        .await?
    }

    async fn find_balance(&self, owner_id: Uuid) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let balance = credit_accounts::table
                .find(owner_id)
                .select(credit_accounts::balance)
                .first::<i64>(&mut conn)
                .optional()?;

            Ok(balance.unwrap_or(0))
        })
        .await?
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransactionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<CreditTransactionEntity>> {
            let mut conn = db_pool.get()?;

            let transactions = credit_transactions::table
                .filter(credit_transactions::owner_id.eq(owner_id))
                .order((
                    credit_transactions::created_at.desc(),
                    credit_transactions::id.desc(),
                ))
                .offset(offset)
                .limit(limit)
                .select(CreditTransactionEntity::as_select())
                .load::<CreditTransactionEntity>(&mut conn)?;

            Ok(transactions)
        })
        .await?
    }

    async fn purchase_boost(
        &self,
        insert_boost_entity: InsertBoostEntity,
        cost: i64,
    ) -> Result<BoostPurchase> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<BoostPurchase> {
            let mut conn = db_pool.get()?;
            let owner_id = insert_boost_entity.owner_id;
            let now = insert_boost_entity.created_at;

            let purchase = conn.transaction::<BoostPurchase, diesel::result::Error, _>(|conn| {
                ensure_account(conn, owner_id, now)?;

                let debited = update(
                    credit_accounts::table
                        .filter(credit_accounts::owner_id.eq(owner_id))
                        .filter(credit_accounts::balance.ge(cost)),
                )
                .set((
                    credit_accounts::balance.eq(credit_accounts::balance - cost),
                    credit_accounts::updated_at.eq(now),
                ))
                .returning(credit_accounts::balance)
                .get_result::<i64>(conn)
                .optional()?;

                if debited.is_none() {
                    let balance = credit_accounts::table
                        .find(owner_id)
                        .select(credit_accounts::balance)
                        .first::<i64>(conn)?;
                    return Ok(BoostPurchase::InsufficientBalance { balance });
                }

                insert_into(credit_transactions::table)
                    .values(&InsertCreditTransactionEntity {
                        owner_id,
                        delta: -cost,
                        reason: BOOST_PURCHASE_REASON.to_string(),
                        created_at: now,
                    })
                    .execute(conn)?;

                let boost = insert_into(boosts::table)
                    .values(&insert_boost_entity)
                    .returning(BoostEntity::as_select())
                    .get_result::<BoostEntity>(conn)?;

                Ok(BoostPurchase::Purchased(boost))
            })?;

            Ok(purchase)
        })
        .await?
    }
}

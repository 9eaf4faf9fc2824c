use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{credit_accounts, credit_transactions};

/// Materialized balance; always equals the sum of the owner's ledger deltas.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = credit_accounts, primary_key(owner_id))]
pub struct CreditAccountEntity {
    pub owner_id: Uuid,
    pub balance: i64,
    pub last_daily_award_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = credit_transactions)]
pub struct CreditTransactionEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = credit_transactions)]
pub struct InsertCreditTransactionEntity {
    pub owner_id: Uuid,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

//! Single-process implementations of the store traits.
//!
//! All tables live behind one mutex, so every conditional update (claim, award, debit,
//! status sweep) is a check-and-set under the same lock, matching the row-level guarantees
//! of the Postgres implementations. Nothing here is shared between processes.

mod credit_ledger;
mod cron_audit;
mod ingestion_jobs;
mod leaderboards;
mod promotions;

use anyhow::{Result, anyhow};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use uuid::Uuid;

use crate::domain::{
    entities::{
        credits::{CreditAccountEntity, CreditTransactionEntity},
        cron_executions::CronExecutionEntity,
        ingestion_jobs::IngestionJobEntity,
        leaderboards::{LeaderboardEntryEntity, LeaderboardSnapshotEntity},
        promotions::{BadgeEntity, BoostEntity},
    },
    value_objects::enums::job_statuses::JobStatus,
};

/// One recorded status change of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTransition {
    pub job_id: Uuid,
    pub from: JobStatus,
    pub to: JobStatus,
}

#[derive(Default)]
struct MemoryTables {
    jobs: HashMap<Uuid, IngestionJobEntity>,
    job_transitions: Vec<JobTransition>,
    cron_executions: Vec<CronExecutionEntity>,
    credit_accounts: HashMap<Uuid, CreditAccountEntity>,
    credit_transactions: Vec<CreditTransactionEntity>,
    boosts: HashMap<Uuid, BoostEntity>,
    badges: HashMap<Uuid, BadgeEntity>,
    snapshots: HashMap<String, (LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, MemoryTables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    /// Every job status change in the order it happened.
    pub fn job_transitions(&self) -> Vec<JobTransition> {
        self.tables()
            .map(|tables| tables.job_transitions.clone())
            .unwrap_or_default()
    }

    pub fn jobs(&self) -> Vec<IngestionJobEntity> {
        self.tables()
            .map(|tables| tables.jobs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn cron_executions(&self) -> Vec<CronExecutionEntity> {
        self.tables()
            .map(|tables| tables.cron_executions.clone())
            .unwrap_or_default()
    }

    pub fn credit_account(&self, owner_id: Uuid) -> Option<CreditAccountEntity> {
        self.tables()
            .ok()
            .and_then(|tables| tables.credit_accounts.get(&owner_id).cloned())
    }

    /// Sum of every ledger delta of `owner_id`.
    pub fn ledger_sum(&self, owner_id: Uuid) -> i64 {
        self.tables()
            .map(|tables| {
                tables
                    .credit_transactions
                    .iter()
                    .filter(|tx| tx.owner_id == owner_id)
                    .map(|tx| tx.delta)
                    .sum()
            })
            .unwrap_or_default()
    }

    pub fn boost(&self, boost_id: Uuid) -> Option<BoostEntity> {
        self.tables()
            .ok()
            .and_then(|tables| tables.boosts.get(&boost_id).cloned())
    }

    pub fn badge(&self, badge_id: Uuid) -> Option<BadgeEntity> {
        self.tables()
            .ok()
            .and_then(|tables| tables.badges.get(&badge_id).cloned())
    }

    /// Seeds a boost row directly, bypassing the credit debit.
    pub fn insert_boost(&self, boost: BoostEntity) -> Result<()> {
        self.tables()?.boosts.insert(boost.id, boost);
        Ok(())
    }

    pub fn insert_badge(&self, badge: BadgeEntity) -> Result<()> {
        self.tables()?.badges.insert(badge.id, badge);
        Ok(())
    }
}

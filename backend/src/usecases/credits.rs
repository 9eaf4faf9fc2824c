use chrono::{DateTime, FixedOffset, Utc};
use crates::domain::{
    repositories::credit_ledger::CreditLedgerRepository,
    value_objects::{
        credits::{CreditTransactionDto, DailyAwardDto},
        pagination::PageRequest,
    },
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::errors::UseCaseResult;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct CreditSettings {
    pub daily_login_credits: i64,
    pub canonical_offset: FixedOffset,
}

/// Credit Engine, user-facing half. Every balance change happens inside the ledger store.
pub struct CreditUseCase<C>
where
    C: CreditLedgerRepository + Send + Sync,
{
    credit_ledger_repository: Arc<C>,
    settings: CreditSettings,
}

impl<C> CreditUseCase<C>
where
    C: CreditLedgerRepository + Send + Sync,
{
    pub fn new(credit_ledger_repository: Arc<C>, settings: CreditSettings) -> Self {
        Self {
            credit_ledger_repository,
            settings,
        }
    }

    pub async fn award_daily_login(&self, owner_id: Uuid) -> UseCaseResult<DailyAwardDto> {
        self.award_daily_login_at(owner_id, Utc::now()).await
    }

    /// Awards at most once per canonical calendar day; repeat calls award 0.
    pub async fn award_daily_login_at(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<DailyAwardDto> {
        let today = now.with_timezone(&self.settings.canonical_offset).date_naive();
        let amount = self.settings.daily_login_credits;

        let awarded = self
            .credit_ledger_repository
            .award_daily_credits(owner_id, today, amount, now)
            .await
            .map_err(|err| {
                error!(%owner_id, %today, db_error = ?err, "credits: daily award failed");
                err
            })?;

        match awarded {
            Some(balance) => {
                info!(%owner_id, %today, amount, balance, "credits: daily login credits awarded");
                Ok(DailyAwardDto {
                    awarded: amount,
                    balance,
                })
            }
            None => {
                let balance = self.credit_ledger_repository.find_balance(owner_id).await?;
                Ok(DailyAwardDto {
                    awarded: 0,
                    balance,
                })
            }
        }
    }

    pub async fn get_balance(&self, owner_id: Uuid) -> UseCaseResult<i64> {
        Ok(self.credit_ledger_repository.find_balance(owner_id).await?)
    }

    /// Newest first.
    pub async fn get_history(
        &self,
        owner_id: Uuid,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> UseCaseResult<(PageRequest, Vec<CreditTransactionDto>)> {
        let page_request =
            PageRequest::clamped(page, limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);

        let transactions = self
            .credit_ledger_repository
            .list_transactions(owner_id, page_request.offset(), page_request.limit)
            .await?;

        Ok((
            page_request,
            transactions
                .into_iter()
                .map(CreditTransactionDto::from)
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use crates::{
        domain::repositories::credit_ledger::MockCreditLedgerRepository,
        infra::memory::MemoryStore,
    };
    use mockall::predicate::{always, eq};

    fn settings(offset_hours: i32) -> CreditSettings {
        CreditSettings {
            daily_login_credits: 10,
            canonical_offset: FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        }
    }

    #[tokio::test]
    async fn award_uses_the_canonical_calendar_day() {
        let owner_id = Uuid::new_v4();
        // 23:30 UTC on March 10th is already March 11th at +07:00.
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap();

        let mut repo = MockCreditLedgerRepository::new();
        repo.expect_award_daily_credits()
            .with(
                eq(owner_id),
                eq(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()),
                eq(10),
                always(),
            )
            .times(1)
            .returning(|_, _, _, _| Box::pin(async move { Ok(Some(10)) }));

        let usecase = CreditUseCase::new(Arc::new(repo), settings(7));
        let award = usecase.award_daily_login_at(owner_id, now).await.unwrap();

        assert_eq!(award, DailyAwardDto { awarded: 10, balance: 10 });
    }

    #[tokio::test]
    async fn repeat_award_returns_zero_and_current_balance() {
        let owner_id = Uuid::new_v4();

        let mut repo = MockCreditLedgerRepository::new();
        repo.expect_award_daily_credits()
            .returning(|_, _, _, _| Box::pin(async move { Ok(None) }));
        repo.expect_find_balance()
            .with(eq(owner_id))
            .returning(|_| Box::pin(async move { Ok(40) }));

        let usecase = CreditUseCase::new(Arc::new(repo), settings(0));
        let award = usecase.award_daily_login(owner_id).await.unwrap();

        assert_eq!(award, DailyAwardDto { awarded: 0, balance: 40 });
    }

    #[tokio::test]
    async fn history_is_paginated_with_clamped_limit() {
        let owner_id = Uuid::new_v4();

        let mut repo = MockCreditLedgerRepository::new();
        repo.expect_list_transactions()
            .with(eq(owner_id), eq(200), eq(MAX_HISTORY_LIMIT))
            .returning(|_, _, _| Box::pin(async move { Ok(Vec::new()) }));

        let usecase = CreditUseCase::new(Arc::new(repo), settings(0));
        let (page, transactions) = usecase
            .get_history(owner_id, Some(3), Some(250))
            .await
            .unwrap();

        assert_eq!(page, PageRequest { page: 3, limit: 100 });
        assert!(transactions.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_awards_on_one_day_credit_once_and_match_the_ledger() {
        let owner_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let store = MemoryStore::new();
        let usecase = Arc::new(CreditUseCase::new(Arc::new(store.clone()), settings(0)));

        let (first, second) = tokio::join!(
            {
                let usecase = Arc::clone(&usecase);
                tokio::spawn(async move { usecase.award_daily_login_at(owner_id, now).await })
            },
            {
                let usecase = Arc::clone(&usecase);
                tokio::spawn(async move { usecase.award_daily_login_at(owner_id, now).await })
            }
        );
        let first = first.unwrap().unwrap();
        let second = second.unwrap().unwrap();

        let mut awarded = vec![first.awarded, second.awarded];
        awarded.sort();
        assert_eq!(awarded, vec![0, 10]);
        assert_eq!(first.balance, 10);
        assert_eq!(second.balance, 10);

        let account = store.credit_account(owner_id).unwrap();
        assert_eq!(account.balance, 10);
        assert_eq!(store.ledger_sum(owner_id), 10);
    }
}

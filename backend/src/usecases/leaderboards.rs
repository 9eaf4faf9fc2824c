use crates::domain::{
    repositories::leaderboards::LeaderboardRepository,
    value_objects::{
        leaderboards::{LeaderboardPageDto, LeaderboardRowDto, LeaderboardSlug},
        pagination::PageRequest,
    },
};
use std::sync::Arc;
use tracing::{debug, error};

use super::errors::{UseCaseError, UseCaseResult};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub struct LeaderboardUseCase<L>
where
    L: LeaderboardRepository + Send + Sync,
{
    leaderboard_repository: Arc<L>,
}

impl<L> LeaderboardUseCase<L>
where
    L: LeaderboardRepository + Send + Sync,
{
    pub fn new(leaderboard_repository: Arc<L>) -> Self {
        Self {
            leaderboard_repository,
        }
    }

    /// Reads one 1-indexed page of the current snapshot. `limit` never exceeds `MAX_PAGE_LIMIT`.
    pub async fn get_leaderboard(
        &self,
        slug: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> UseCaseResult<LeaderboardPageDto> {
        let slug: LeaderboardSlug = slug
            .parse()
            .map_err(|err| UseCaseError::Validation(format!("{err}")))?;
        let page_request = PageRequest::clamped(page, limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);

        let (snapshot, entries) = self
            .leaderboard_repository
            .load_snapshot_page(slug.to_string(), page_request.offset(), page_request.limit)
            .await
            .map_err(|err| {
                error!(%slug, db_error = ?err, "leaderboards: failed to load snapshot");
                err
            })?
            .ok_or_else(|| UseCaseError::NotFound("Leaderboard".to_string()))?;

        debug!(%slug, page = page_request.page, rows = entries.len(), "leaderboards: page served");

        Ok(LeaderboardPageDto {
            slug: snapshot.slug,
            computed_at: snapshot.computed_at,
            page: page_request.page,
            limit: page_request.limit,
            total: i64::from(snapshot.entry_count),
            entries: entries
                .into_iter()
                .map(|entry| LeaderboardRowDto {
                    rank: entry.rank,
                    owner_id: entry.owner_id,
                    score: entry.score,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::leaderboards::{LeaderboardEntryEntity, LeaderboardSnapshotEntity},
        repositories::leaderboards::MockLeaderboardRepository,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    #[tokio::test]
    async fn clamps_limit_and_maps_page_offset() {
        let mut repo = MockLeaderboardRepository::new();
        let computed_at = Utc::now();

        repo.expect_load_snapshot_page()
            .with(eq("weekly-authors-fiction".to_string()), eq(100), eq(100))
            .times(1)
            .returning(move |slug, _, _| {
                let snapshot = LeaderboardSnapshotEntity {
                    slug: slug.clone(),
                    computed_at,
                    entry_count: 101,
                };
                let entry = LeaderboardEntryEntity {
                    slug,
                    position: 101,
                    rank: 99,
                    owner_id: Uuid::nil(),
                    score: 3,
                    achieved_at: computed_at,
                };
                Box::pin(async move { Ok(Some((snapshot, vec![entry]))) })
            });

        let usecase = LeaderboardUseCase::new(Arc::new(repo));
        let page = usecase
            .get_leaderboard("weekly-authors-fiction", Some(2), Some(1_000))
            .await
            .unwrap();

        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 101);
        assert_eq!(page.entries[0].rank, 99);
    }

    #[tokio::test]
    async fn never_computed_slug_is_not_found() {
        let mut repo = MockLeaderboardRepository::new();
        repo.expect_load_snapshot_page()
            .returning(|_, _, _| Box::pin(async move { Ok(None) }));

        let usecase = LeaderboardUseCase::new(Arc::new(repo));
        let result = usecase
            .get_leaderboard("daily-authors-overall", None, None)
            .await;

        assert!(matches!(result, Err(UseCaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn malformed_slug_is_rejected_before_reading() {
        let mut repo = MockLeaderboardRepository::new();
        repo.expect_load_snapshot_page().never();

        let usecase = LeaderboardUseCase::new(Arc::new(repo));
        let result = usecase.get_leaderboard("best-authors", None, None).await;

        assert!(matches!(result, Err(UseCaseError::Validation(_))));
    }
}

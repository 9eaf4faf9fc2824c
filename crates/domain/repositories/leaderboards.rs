use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::{
    entities::leaderboards::{LeaderboardEntryEntity, LeaderboardSnapshotEntity},
    value_objects::leaderboards::{LeaderboardSlug, RankedEntry, ScoreInput},
};

#[async_trait]
#[automock]
pub trait LeaderboardRepository {
    /// Swaps the whole snapshot for `slug`; readers see the old or the new ranking, never a mix.
    async fn replace_snapshot(
        &self,
        slug: String,
        computed_at: DateTime<Utc>,
        entries: Vec<RankedEntry>,
    ) -> Result<()>;

    /// Reads the snapshot header and one page of its rows from the same snapshot.
    async fn load_snapshot_page(
        &self,
        slug: String,
        offset: i64,
        limit: i64,
    ) -> Result<Option<(LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)>>;
}

/// Source of aggregated scores; owned outside this subsystem.
#[async_trait]
#[automock]
pub trait LeaderboardScoreSource {
    async fn fetch_scores(
        &self,
        slug: LeaderboardSlug,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScoreInput>>;
}

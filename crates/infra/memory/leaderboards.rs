use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::MemoryStore;
use crate::domain::{
    entities::leaderboards::{LeaderboardEntryEntity, LeaderboardSnapshotEntity, snapshot_rows},
    repositories::leaderboards::LeaderboardRepository,
    value_objects::leaderboards::RankedEntry,
};

#[async_trait]
impl LeaderboardRepository for MemoryStore {
    async fn replace_snapshot(
        &self,
        slug: String,
        computed_at: DateTime<Utc>,
        entries: Vec<RankedEntry>,
    ) -> Result<()> {
        let (snapshot, rows) = snapshot_rows(&slug, computed_at, entries)?;

        self.tables()?.snapshots.insert(slug, (snapshot, rows));
        Ok(())
    }

    async fn load_snapshot_page(
        &self,
        slug: String,
        offset: i64,
        limit: i64,
    ) -> Result<Option<(LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)>> {
        let tables = self.tables()?;

        Ok(tables.snapshots.get(&slug).map(|(snapshot, rows)| {
            let page = rows
                .iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .cloned()
                .collect();
            (snapshot.clone(), page)
        }))
    }
}

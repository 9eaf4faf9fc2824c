use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::leaderboards::RankedEntry,
    infra::db::postgres::schema::{leaderboard_entries, leaderboard_snapshots},
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Insertable)]
#[diesel(table_name = leaderboard_snapshots, primary_key(slug))]
pub struct LeaderboardSnapshotEntity {
    pub slug: String,
    pub computed_at: DateTime<Utc>,
    pub entry_count: i32,
}

/// `position` is the 1-based row order; `rank` repeats for ties.
#[derive(Debug, Clone, PartialEq, Selectable, Queryable, Insertable)]
#[diesel(table_name = leaderboard_entries)]
pub struct LeaderboardEntryEntity {
    pub slug: String,
    pub position: i32,
    pub rank: i32,
    pub owner_id: Uuid,
    pub score: i64,
    pub achieved_at: DateTime<Utc>,
}

/// Snapshot header and its rows, in ranking order.
pub fn snapshot_rows(
    slug: &str,
    computed_at: DateTime<Utc>,
    entries: Vec<RankedEntry>,
) -> Result<(LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)> {
    let entry_count = snapshot_entry_count(entries.len())
        .with_context(|| format!("leaderboard {slug}"))?;

    let rows = (1..=entry_count)
        .zip(entries)
        .map(|(position, entry)| LeaderboardEntryEntity {
            slug: slug.to_string(),
            position,
            rank: entry.rank,
            owner_id: entry.owner_id,
            score: entry.score,
            achieved_at: entry.achieved_at,
        })
        .collect();

    let snapshot = LeaderboardSnapshotEntity {
        slug: slug.to_string(),
        computed_at,
        entry_count,
    };

    Ok((snapshot, rows))
}

fn snapshot_entry_count(len: usize) -> Result<i32> {
    i32::try_from(len).with_context(|| format!("{len} entries do not fit in one snapshot"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_ranking_order() {
        let now = Utc::now();
        let entries: Vec<RankedEntry> = [(1, 30), (1, 30), (3, 10)]
            .into_iter()
            .map(|(rank, score)| RankedEntry {
                rank,
                owner_id: Uuid::new_v4(),
                score,
                achieved_at: now,
            })
            .collect();

        let (snapshot, rows) = snapshot_rows("weekly-authors-overall", now, entries).unwrap();

        assert_eq!(snapshot.entry_count, 3);
        let positions: Vec<(i32, i32)> = rows.iter().map(|row| (row.position, row.rank)).collect();
        assert_eq!(positions, vec![(1, 1), (2, 1), (3, 3)]);
    }

    #[test]
    fn oversized_ranking_is_rejected_instead_of_truncated() {
        assert_eq!(snapshot_entry_count(i32::MAX as usize).unwrap(), i32::MAX);
        assert!(snapshot_entry_count(i32::MAX as usize + 1).is_err());
    }
}

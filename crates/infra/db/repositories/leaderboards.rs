use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::leaderboards::{LeaderboardEntryEntity, LeaderboardSnapshotEntity, snapshot_rows},
        repositories::leaderboards::LeaderboardRepository,
        value_objects::leaderboards::RankedEntry,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{leaderboard_entries, leaderboard_snapshots},
    },
};

// Keeps each INSERT well under the 65535 bind-parameter limit (6 columns per row).
const INSERT_CHUNK_SIZE: usize = 5_000;

pub struct LeaderboardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl LeaderboardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LeaderboardRepository for LeaderboardPostgres {
    async fn replace_snapshot(
        &self,
        slug: String,
        computed_at: DateTime<Utc>,
        entries: Vec<RankedEntry>,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            let (snapshot, rows) = snapshot_rows(&slug, computed_at, entries)?;

            conn.transaction::<(), diesel::result::Error, _>(|conn| {
                insert_into(leaderboard_snapshots::table)
                    .values(&snapshot)
                    .on_conflict(leaderboard_snapshots::slug)
                    .do_update()
                    .set((
                        leaderboard_snapshots::computed_at
                            .eq(excluded(leaderboard_snapshots::computed_at)),
                        leaderboard_snapshots::entry_count
                            .eq(excluded(leaderboard_snapshots::entry_count)),
                    ))
                    .execute(conn)?;

                // Entries reference the snapshot row, so the header is written first.
                delete(leaderboard_entries::table.filter(leaderboard_entries::slug.eq(&slug)))
                    .execute(conn)?;

                for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
                    insert_into(leaderboard_entries::table)
                        .values(chunk)
                        .execute(conn)?;
                }

                Ok(())
            })?;

            Ok(())
        })
        .await?
    }

    async fn load_snapshot_page(
        &self,
        slug: String,
        offset: i64,
        limit: i64,
    ) -> Result<Option<(LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(
            move || -> Result<Option<(LeaderboardSnapshotEntity, Vec<LeaderboardEntryEntity>)>> {
                let mut conn = db_pool.get()?;

                // Header and rows must come from the same committed snapshot.
                let page = conn
                    .build_transaction()
                    .repeatable_read()
                    .read_only()
                    .run::<_, diesel::result::Error, _>(|conn| {
                        let Some(snapshot) = leaderboard_snapshots::table
                            .find(&slug)
                            .select(LeaderboardSnapshotEntity::as_select())
                            .first::<LeaderboardSnapshotEntity>(conn)
                            .optional()?
                        else {
                            return Ok(None);
                        };

                        let entries = leaderboard_entries::table
                            .filter(leaderboard_entries::slug.eq(&slug))
                            .order(leaderboard_entries::position.asc())
                            .offset(offset)
                            .limit(limit)
                            .select(LeaderboardEntryEntity::as_select())
                            .load::<LeaderboardEntryEntity>(conn)?;

                        Ok(Some((snapshot, entries)))
                    })?;

                Ok(page)
            },
        )
        .await?
    }
}

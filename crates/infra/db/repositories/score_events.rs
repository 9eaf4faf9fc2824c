use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    QueryableByName, RunQueryDsl, sql_query,
    sql_types::{BigInt, Bool, Nullable, Text, Timestamptz, Uuid as SqlUuid},
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::leaderboards::LeaderboardScoreSource,
        value_objects::leaderboards::{LeaderboardSlug, ScoreInput},
    },
    infra::db::postgres::postgres_connection::PgPoolSquad,
};

// SUM(bigint) is numeric in Postgres; cast back so it maps onto i64.
const AGGREGATE_SCORES_SQL: &str = r#"
SELECT owner_id,
       CAST(SUM(points) AS BIGINT) AS score,
       MAX(occurred_at) AS achieved_at
FROM score_events
WHERE board = $1
  AND ($2 OR category = $3)
  AND ($4 IS NULL OR occurred_at >= $4)
GROUP BY owner_id
"#;

#[derive(Debug, QueryableByName)]
struct ScoreRow {
    #[diesel(sql_type = SqlUuid)]
    owner_id: Uuid,
    #[diesel(sql_type = BigInt)]
    score: i64,
    #[diesel(sql_type = Timestamptz)]
    achieved_at: DateTime<Utc>,
}

/// Aggregates `score_events` rows into one score per owner.
pub struct ScoreEventsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ScoreEventsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LeaderboardScoreSource for ScoreEventsPostgres {
    async fn fetch_scores(
        &self,
        slug: LeaderboardSlug,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScoreInput>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<ScoreInput>> {
            let mut conn = db_pool.get()?;

            let rows = sql_query(AGGREGATE_SCORES_SQL)
                .bind::<Text, _>(&slug.board)
                .bind::<Bool, _>(slug.is_overall())
                .bind::<Text, _>(&slug.category)
                .bind::<Nullable<Timestamptz>, _>(since)
                .load::<ScoreRow>(&mut conn)?;

            Ok(rows
                .into_iter()
                .map(|row| ScoreInput {
                    owner_id: row.owner_id,
                    score: row.score,
                    achieved_at: row.achieved_at,
                })
                .collect())
        })
        .await?
    }
}

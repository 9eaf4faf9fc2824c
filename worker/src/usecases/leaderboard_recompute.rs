use anyhow::{Context, Result};
use chrono::{FixedOffset, Utc};
use crates::domain::{
    ranking::rank_scores,
    repositories::leaderboards::{LeaderboardRepository, LeaderboardScoreSource},
    value_objects::leaderboards::LeaderboardSlug,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugOutcome {
    pub slug: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct LeaderboardRecomputeUseCase {
    score_source: Arc<dyn LeaderboardScoreSource + Send + Sync>,
    leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync>,
    canonical_offset: FixedOffset,
}

impl LeaderboardRecomputeUseCase {
    pub fn new(
        score_source: Arc<dyn LeaderboardScoreSource + Send + Sync>,
        leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync>,
        canonical_offset: FixedOffset,
    ) -> Self {
        Self {
            score_source,
            leaderboard_repository,
            canonical_offset,
        }
    }

    /// Recomputes one board and replaces its snapshot. Returns the number of ranked rows.
    pub async fn calculate(&self, slug: &str) -> Result<usize> {
        let parsed: LeaderboardSlug = slug.parse()?;
        let computed_at = Utc::now();
        let since = parsed.scope.window_start(computed_at, self.canonical_offset);

        let scores = self
            .score_source
            .fetch_scores(parsed, since)
            .await
            .with_context(|| format!("fetch scores for {slug}"))?;

        let ranked = rank_scores(scores).with_context(|| format!("rank scores for {slug}"))?;
        let entries = ranked.len();

        self.leaderboard_repository
            .replace_snapshot(slug.to_string(), computed_at, ranked)
            .await
            .with_context(|| format!("replace snapshot for {slug}"))?;

        info!(slug, entries, "leaderboard_recompute: snapshot replaced");
        Ok(entries)
    }

    /// Runs every slug independently; one failing board leaves the others untouched.
    pub async fn recalculate_all(&self, slugs: &[String]) -> Vec<SlugOutcome> {
        let mut outcomes = Vec::with_capacity(slugs.len());

        for slug in slugs {
            let outcome = match self.calculate(slug).await {
                Ok(entries) => SlugOutcome {
                    slug: slug.clone(),
                    status: "ok",
                    entries: Some(entries),
                    error: None,
                },
                Err(err) => {
                    error!(slug = %slug, error = ?err, "leaderboard_recompute: failed");
                    SlugOutcome {
                        slug: slug.clone(),
                        status: "error",
                        entries: None,
                        error: Some(format!("{err:#}")),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

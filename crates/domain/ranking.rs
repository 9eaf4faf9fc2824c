use anyhow::{Context, Result};

use crate::domain::value_objects::leaderboards::{RankedEntry, ScoreInput};

/// Orders scores for a leaderboard snapshot.
///
/// Rows sort by score (highest first), then by `achieved_at` (whoever reached the score
/// first), then by owner id so that equal inputs always produce the same order. Ranks use
/// competition ranking: equal scores share a rank and the next distinct score skips ahead,
/// e.g. scores `30, 30, 10` rank `1, 1, 3`.
pub fn rank_scores(mut scores: Vec<ScoreInput>) -> Result<Vec<RankedEntry>> {
    scores.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.achieved_at.cmp(&b.achieved_at))
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });

    let mut ranked = Vec::with_capacity(scores.len());
    let mut previous_score = None;
    let mut current_rank = 0;

    for (index, input) in scores.into_iter().enumerate() {
        if previous_score != Some(input.score) {
            current_rank = rank_at(index)?;
            previous_score = Some(input.score);
        }
        ranked.push(RankedEntry {
            rank: current_rank,
            owner_id: input.owner_id,
            score: input.score,
            achieved_at: input.achieved_at,
        });
    }

    Ok(ranked)
}

fn rank_at(index: usize) -> Result<i32> {
    index
        .checked_add(1)
        .and_then(|rank| i32::try_from(rank).ok())
        .with_context(|| format!("position {index} exceeds the rank range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn input(owner_id: Uuid, score: i64, minutes: i64) -> ScoreInput {
        ScoreInput {
            owner_id,
            score,
            achieved_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn ties_share_rank_and_next_rank_skips() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let ranked = rank_scores(vec![input(c, 10, 0), input(a, 30, 5), input(b, 30, 1)]).unwrap();

        let ranks: Vec<i32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        // b reached 30 before a.
        assert_eq!(ranked[0].owner_id, b);
        assert_eq!(ranked[1].owner_id, a);
        assert_eq!(ranked[2].owner_id, c);
    }

    #[test]
    fn order_does_not_depend_on_input_order() {
        let owners: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let inputs: Vec<ScoreInput> = owners.iter().map(|id| input(*id, 7, 0)).collect();

        let forward = rank_scores(inputs.clone()).unwrap();
        let mut reversed_inputs = inputs;
        reversed_inputs.reverse();
        let reversed = rank_scores(reversed_inputs).unwrap();

        assert_eq!(forward, reversed);
        assert!(forward.iter().all(|entry| entry.rank == 1));
    }

    #[test]
    fn empty_input_yields_empty_ranking() {
        assert!(rank_scores(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn rank_past_i32_range_is_an_error() {
        assert_eq!(rank_at(0).unwrap(), 1);
        assert_eq!(rank_at(i32::MAX as usize - 1).unwrap(), i32::MAX);
        assert!(rank_at(i32::MAX as usize).is_err());
        assert!(rank_at(usize::MAX).is_err());
    }
}

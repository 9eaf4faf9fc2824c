use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use crate::domain::value_objects::enums::leaderboard_scopes::LeaderboardScope;

pub const OVERALL_CATEGORY: &str = "overall";

/// Identifies one board, written `<scope>-<board>-<category>`, e.g. `weekly-authors-fiction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardSlug {
    pub scope: LeaderboardScope,
    pub board: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid leaderboard slug `{slug}`: {reason}")]
pub struct InvalidSlug {
    pub slug: String,
    pub reason: &'static str,
}

impl LeaderboardSlug {
    pub fn is_overall(&self) -> bool {
        self.category == OVERALL_CATEGORY
    }
}

impl FromStr for LeaderboardSlug {
    type Err = InvalidSlug;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| InvalidSlug {
            slug: raw.to_string(),
            reason,
        };

        let mut parts = raw.split('-');
        let (Some(scope), Some(board), Some(category), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected <scope>-<board>-<category>"));
        };

        let scope = LeaderboardScope::from_str(scope).ok_or(invalid("unknown scope"))?;
        if !is_token(board) {
            return Err(invalid("board must be [a-z0-9_]+"));
        }
        if !is_token(category) {
            return Err(invalid("category must be [a-z0-9_]+"));
        }

        Ok(Self {
            scope,
            board: board.to_string(),
            category: category.to_string(),
        })
    }
}

impl Display for LeaderboardSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.scope, self.board, self.category)
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Aggregated score for one owner, as produced by the scoring source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInput {
    pub owner_id: Uuid,
    pub score: i64,
    /// When the owner reached `score`; earlier wins ties.
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: i32,
    pub owner_id: Uuid,
    pub score: i64,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRowDto {
    pub rank: i32,
    pub owner_id: Uuid,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPageDto {
    pub slug: String,
    pub computed_at: DateTime<Utc>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub entries: Vec<LeaderboardRowDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scope_board_and_category() {
        let slug: LeaderboardSlug = "weekly-authors-fiction".parse().unwrap();
        assert_eq!(slug.scope, LeaderboardScope::Weekly);
        assert_eq!(slug.board, "authors");
        assert_eq!(slug.category, "fiction");
        assert!(!slug.is_overall());
        assert_eq!(slug.to_string(), "weekly-authors-fiction");
    }

    #[test]
    fn all_time_scope_keeps_its_underscore() {
        let slug: LeaderboardSlug = "all_time-authors-overall".parse().unwrap();
        assert_eq!(slug.scope, LeaderboardScope::AllTime);
        assert!(slug.is_overall());
    }

    #[test]
    fn rejects_malformed_slugs() {
        for raw in [
            "",
            "weekly",
            "weekly-authors",
            "yearly-authors-fiction",
            "weekly-Authors-fiction",
            "weekly-authors-fiction-extra",
            "weekly--fiction",
        ] {
            assert!(raw.parse::<LeaderboardSlug>().is_err(), "{raw} should be rejected");
        }
    }
}

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardScope {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl Display for LeaderboardScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = match self {
            LeaderboardScope::Daily => "daily",
            LeaderboardScope::Weekly => "weekly",
            LeaderboardScope::Monthly => "monthly",
            LeaderboardScope::AllTime => "all_time",
        };
        write!(f, "{}", scope)
    }
}

impl LeaderboardScope {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(LeaderboardScope::Daily),
            "weekly" => Some(LeaderboardScope::Weekly),
            "monthly" => Some(LeaderboardScope::Monthly),
            "all_time" => Some(LeaderboardScope::AllTime),
            _ => None,
        }
    }

    /// Lower bound of the scoring window, `None` for all-time boards.
    /// Daily windows start at midnight in the canonical offset.
    pub fn window_start(&self, now: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
        match self {
            LeaderboardScope::Daily => {
                let local_midnight = now
                    .with_timezone(&offset)
                    .date_naive()
                    .and_hms_opt(0, 0, 0)?;
                local_midnight
                    .and_local_timezone(offset)
                    .single()
                    .map(|start| start.with_timezone(&Utc))
            }
            LeaderboardScope::Weekly => Some(now - Duration::days(7)),
            LeaderboardScope::Monthly => Some(now - Duration::days(30)),
            LeaderboardScope::AllTime => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn daily_window_starts_at_canonical_midnight() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        // 2026-03-10 20:00 UTC is 2026-03-11 03:00 at +07:00.
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 20, 0, 0).unwrap();
        let start = LeaderboardScope::Daily.window_start(now, offset).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 10, 17, 0, 0).unwrap());
    }

    #[test]
    fn all_time_has_no_window() {
        let offset = FixedOffset::east_opt(0).unwrap();
        assert!(
            LeaderboardScope::AllTime
                .window_start(Utc::now(), offset)
                .is_none()
        );
    }
}

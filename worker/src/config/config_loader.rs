use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use std::{env, str::FromStr};
use url::Url;

use super::config_model::{
    Cron, Database, DotEnvyConfig, Ingestion, Leaderboards, PlatformConnector, Scheduler,
    WorkerServer,
};

pub const MAX_BATCH_LIMIT: i64 = 100;

pub const DEFAULT_LEADERBOARD_SLUGS: &str = "weekly-authors-overall,weekly-authors-fiction,weekly-authors-nonfiction,monthly-authors-overall,all_time-authors-overall";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?,
        body_limit: required("SERVER_BODY_LIMIT")?,
        timeout: required("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        pool_size: optional("DATABASE_POOL_SIZE", 10)?,
    };

    let cron = Cron {
        queue_token: non_empty("CRON_QUEUE_TOKEN"),
        scheduler_secret: non_empty("CRON_SCHEDULER_SECRET"),
    };

    let ingestion = Ingestion {
        batch_limit: optional::<i64>("INGESTION_BATCH_LIMIT", 10)?.clamp(1, MAX_BATCH_LIMIT),
        job_timeout_secs: optional::<u64>("INGESTION_JOB_TIMEOUT_SECS", 60)?.max(1),
        stale_after_minutes: optional::<i64>("INGESTION_STALE_AFTER_MINUTES", 30)?.max(1),
    };
    validate_ingestion(&ingestion)?;

    let slugs = parse_slugs(
        &non_empty("LEADERBOARD_SLUGS").unwrap_or_else(|| DEFAULT_LEADERBOARD_SLUGS.to_string()),
    );
    let leaderboards = Leaderboards {
        slugs,
        canonical_offset: canonical_offset(optional("CANONICAL_UTC_OFFSET_HOURS", 0)?)?,
    };

    let platform_connector = PlatformConnector {
        base_url: Url::parse(&required::<String>("PLATFORM_CONNECTOR_URL")?)
            .context("PLATFORM_CONNECTOR_URL is invalid")?,
        token: non_empty("PLATFORM_CONNECTOR_TOKEN"),
    };

    let scheduler = Scheduler {
        enabled: optional("INTERNAL_SCHEDULER_ENABLED", false)?,
        interval_secs: optional::<u64>("INTERNAL_SCHEDULER_INTERVAL_SECS", 300)?.max(1),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        cron,
        ingestion,
        leaderboards,
        platform_connector,
        scheduler,
    })
}

/// Comma separated, blanks dropped. Slugs are validated when they are computed.
pub fn parse_slugs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn canonical_offset(hours: i32) -> Result<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        bail!("CANONICAL_UTC_OFFSET_HOURS must be within -12..=14, got {hours}");
    }

    FixedOffset::east_opt(hours * 3600)
        .with_context(|| format!("CANONICAL_UTC_OFFSET_HOURS={hours} is not a valid offset"))
}

/// Claims are renewed before every job, so a live claim only goes stale if one sync outlasts
/// the stale window.
pub fn validate_ingestion(ingestion: &Ingestion) -> Result<()> {
    let stale_after_secs = u64::try_from(ingestion.stale_after_minutes)
        .context("INGESTION_STALE_AFTER_MINUTES must be positive")?
        .saturating_mul(60);

    if stale_after_secs <= ingestion.job_timeout_secs {
        bail!(
            "INGESTION_STALE_AFTER_MINUTES ({}m) must be longer than INGESTION_JOB_TIMEOUT_SECS ({}s)",
            ingestion.stale_after_minutes,
            ingestion.job_timeout_secs
        );
    }

    Ok(())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = non_empty(key).with_context(|| format!("{key} is not set"))?;
    raw.parse().with_context(|| format!("{key} is invalid"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_split_and_trimmed() {
        assert_eq!(
            parse_slugs(" weekly-authors-overall, ,daily-authors-fiction,"),
            vec!["weekly-authors-overall", "daily-authors-fiction"]
        );
        assert_eq!(parse_slugs(DEFAULT_LEADERBOARD_SLUGS).len(), 5);
    }

    #[test]
    fn stale_window_must_outlast_one_job() {
        let ingestion = |job_timeout_secs, stale_after_minutes| Ingestion {
            batch_limit: 100,
            job_timeout_secs,
            stale_after_minutes,
        };

        assert!(validate_ingestion(&ingestion(60, 30)).is_ok());
        assert!(validate_ingestion(&ingestion(1800, 30)).is_err());
        assert!(validate_ingestion(&ingestion(3600, 30)).is_err());
    }

    #[test]
    fn canonical_offset_is_bounded() {
        assert!(canonical_offset(14).is_ok());
        assert!(canonical_offset(-12).is_ok());
        assert!(canonical_offset(20).is_err());
    }
}

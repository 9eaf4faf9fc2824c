use chrono::FixedOffset;
use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub cron: Cron,
    pub ingestion: Ingestion,
    pub leaderboards: Leaderboards,
    pub platform_connector: PlatformConnector,
    pub scheduler: Scheduler,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub pool_size: u32,
}

/// Trigger credentials. With neither set the cron endpoints refuse to run.
#[derive(Debug, Clone, Default)]
pub struct Cron {
    pub queue_token: Option<String>,
    pub scheduler_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Ingestion {
    pub batch_limit: i64,
    pub job_timeout_secs: u64,
    pub stale_after_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct Leaderboards {
    pub slugs: Vec<String>,
    pub canonical_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct PlatformConnector {
    pub base_url: Url,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pub enabled: bool,
    pub interval_secs: u64,
}

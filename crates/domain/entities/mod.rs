pub mod credits;
pub mod cron_executions;
pub mod ingestion_jobs;
pub mod leaderboards;
pub mod promotions;

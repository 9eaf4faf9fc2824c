pub mod credit_ledger;
pub mod cron_audit;
pub mod ingestion_jobs;
pub mod leaderboards;
pub mod promotions;
pub mod score_events;

pub mod cron_runs;
pub mod ingestion_batch;
pub mod leaderboard_recompute;
pub mod promotion_sweep;

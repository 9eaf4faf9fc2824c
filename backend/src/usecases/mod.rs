pub mod credits;
pub mod errors;
pub mod ingestion_jobs;
pub mod leaderboards;
pub mod promotions;

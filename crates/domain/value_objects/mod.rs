pub mod credits;
pub mod enums;
pub mod ingestion_jobs;
pub mod leaderboards;
pub mod pagination;
pub mod promotions;

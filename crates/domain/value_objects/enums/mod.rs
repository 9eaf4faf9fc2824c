pub mod boost_statuses;
pub mod cron_statuses;
pub mod job_statuses;
pub mod leaderboard_scopes;
pub mod platforms;

pub mod cron_jobs;
pub mod scheduler_loop;

pub mod credits;
pub mod ingestion_jobs;
pub mod leaderboards;
pub mod promotions;

#[cfg(test)]
pub(crate) mod test_support;

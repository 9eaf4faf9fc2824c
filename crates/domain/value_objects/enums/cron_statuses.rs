use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CronStatus {
    Started,
    Completed,
    Failed,
}

impl Display for CronStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            CronStatus::Started => "started",
            CronStatus::Completed => "completed",
            CronStatus::Failed => "failed",
        };
        write!(f, "{}", status)
    }
}

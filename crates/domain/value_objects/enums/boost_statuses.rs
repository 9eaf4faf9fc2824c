use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Only the promotion sweep moves a boost forward; purchases always start `Scheduled`.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoostStatus {
    #[default]
    Scheduled,
    Active,
    Completed,
}

impl Display for BoostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            BoostStatus::Scheduled => "scheduled",
            BoostStatus::Active => "active",
            BoostStatus::Completed => "completed",
        };
        write!(f, "{}", status)
    }
}

impl BoostStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(BoostStatus::Scheduled),
            "active" => Some(BoostStatus::Active),
            "completed" => Some(BoostStatus::Completed),
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Sales platforms an author can connect and sync from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    AmazonKdp,
    Gumroad,
    Smashwords,
    #[serde(rename = "draft2digital")]
    Draft2Digital,
    Whop,
    Kobo,
    #[serde(rename = "ingramspark")]
    IngramSpark,
    Payhip,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::AmazonKdp,
        Platform::Gumroad,
        Platform::Smashwords,
        Platform::Draft2Digital,
        Platform::Whop,
        Platform::Kobo,
        Platform::IngramSpark,
        Platform::Payhip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AmazonKdp => "amazon_kdp",
            Platform::Gumroad => "gumroad",
            Platform::Smashwords => "smashwords",
            Platform::Draft2Digital => "draft2digital",
            Platform::Whop => "whop",
            Platform::Kobo => "kobo",
            Platform::IngramSpark => "ingramspark",
            Platform::Payhip => "payhip",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unsupported platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == normalized)
            .ok_or(UnknownPlatform(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_platforms_case_insensitively() {
        assert_eq!("gumroad".parse::<Platform>(), Ok(Platform::Gumroad));
        assert_eq!(" Amazon_KDP ".parse::<Platform>(), Ok(Platform::AmazonKdp));
        assert_eq!(
            "draft2digital".parse::<Platform>(),
            Ok(Platform::Draft2Digital)
        );
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert_eq!(err, UnknownPlatform("myspace".to_string()));
    }

    #[test]
    fn display_and_serde_agree_on_stored_value() {
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
            assert_eq!(
                serde_json::to_value(platform).unwrap(),
                serde_json::Value::String(platform.to_string())
            );
        }
    }
}

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Logical bucket a photo belongs to. Affects storage key namespacing:
/// `events` keys are additionally scoped by an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Portfolio,
    Events,
    Slideshow,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Portfolio => "portfolio",
            AssetType::Events => "events",
            AssetType::Slideshow => "slideshow",
        }
    }
}

impl FromStr for AssetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "portfolio" => Ok(AssetType::Portfolio),
            "events" => Ok(AssetType::Events),
            "slideshow" => Ok(AssetType::Slideshow),
            _ => Err(anyhow::anyhow!("Invalid asset type: {}", s)),
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_round_trip() {
        for s in ["portfolio", "events", "slideshow"] {
            let t: AssetType = s.parse().unwrap();
            assert_eq!(t.as_str(), s);
        }
        assert!("gallery".parse::<AssetType>().is_err());
    }
}

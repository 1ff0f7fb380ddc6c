// Definitions that are used throughout all modules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Enumeration to track which lattice a query or layer refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    #[default]
    Primal,
    Dual,
}

impl Space {
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Primal => "primal",
            Space::Dual => "dual",
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Space {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primal" => Ok(Space::Primal),
            "dual" => Ok(Space::Dual),
            other => Err(anyhow::anyhow!("Unknown lattice space: {}", other)),
        }
    }
}

// How dual lattice points are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointVariant {
    #[default]
    Hollow,
    Solid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_round_trips_through_str() {
        assert_eq!("dual".parse::<Space>().unwrap(), Space::Dual);
        assert_eq!(" Primal ".parse::<Space>().unwrap(), Space::Primal);
        assert_eq!(Space::Dual.to_string(), "dual");
        assert!("reciprocal".parse::<Space>().is_err());
    }
}

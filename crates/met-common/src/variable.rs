//! Catalogue of the CMIP6 daily variables the MET pipeline understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetError;

/// Variables that must be present before a MET document can be assembled.
pub const REQUIRED_VARIABLES: [ClimateVariable; 3] = [
    ClimateVariable::MaxTemperature,
    ClimateVariable::MinTemperature,
    ClimateVariable::Precipitation,
];

/// A CMIP6 daily variable and the MET column it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClimateVariable {
    /// `tasmax`, daily maximum near-surface air temperature (°C)
    MaxTemperature,
    /// `tasmin`, daily minimum near-surface air temperature (°C)
    MinTemperature,
    /// `pr`, daily precipitation (mm)
    Precipitation,
    /// `rsds`, surface downwelling shortwave radiation (W/m²)
    Radiation,
    /// `hurs`, near-surface relative humidity (%)
    RelativeHumidity,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 5] = [
        ClimateVariable::MaxTemperature,
        ClimateVariable::MinTemperature,
        ClimateVariable::Precipitation,
        ClimateVariable::Radiation,
        ClimateVariable::RelativeHumidity,
    ];

    /// CMIP6 variable identifier, as used in file and directory names.
    pub fn id(&self) -> &'static str {
        match self {
            ClimateVariable::MaxTemperature => "tasmax",
            ClimateVariable::MinTemperature => "tasmin",
            ClimateVariable::Precipitation => "pr",
            ClimateVariable::Radiation => "rsds",
            ClimateVariable::RelativeHumidity => "hurs",
        }
    }

    /// Look up a variable from its CMIP6 identifier (case-insensitive).
    pub fn from_id(id: &str) -> Option<Self> {
        let lower = id.trim().to_lowercase();
        Self::ALL.iter().copied().find(|v| v.id() == lower)
    }

    pub fn is_required(&self) -> bool {
        REQUIRED_VARIABLES.contains(self)
    }
}

impl fmt::Display for ClimateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ClimateVariable {
    type Err = MetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| MetError::UnknownVariable(s.to_string()))
    }
}

impl TryFrom<String> for ClimateVariable {
    type Error = MetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClimateVariable> for String {
    fn from(value: ClimateVariable) -> Self {
        value.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for var in ClimateVariable::ALL {
            assert_eq!(ClimateVariable::from_id(var.id()), Some(var));
        }
        assert_eq!(ClimateVariable::from_id("TASMAX"), Some(ClimateVariable::MaxTemperature));
        assert_eq!(ClimateVariable::from_id("sfcWind"), None);
    }

    #[test]
    fn test_required() {
        assert!(ClimateVariable::Precipitation.is_required());
        assert!(!ClimateVariable::Radiation.is_required());
        assert!(!ClimateVariable::RelativeHumidity.is_required());
    }

    #[test]
    fn test_serde_as_id() {
        let vars: Vec<ClimateVariable> = serde_yaml::from_str("[tasmax, rsds]").unwrap();
        assert_eq!(vars, vec![ClimateVariable::MaxTemperature, ClimateVariable::Radiation]);
        assert!(serde_yaml::from_str::<Vec<ClimateVariable>>("[wind]").is_err());
    }
}

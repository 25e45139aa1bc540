//! The fixed pollutant catalogue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pollutants measured by the monitoring stations.
///
/// Serializes as its CSV column name (`"PM2.5"`, `"NOx"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "NOx")]
    Nox,
    #[serde(rename = "NH3")]
    Nh3,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "O3")]
    O3,
    Benzene,
    Toluene,
    Xylene,
}

impl Pollutant {
    /// Every pollutant, in canonical column order
    pub const ALL: [Pollutant; 12] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::Nox,
        Pollutant::Nh3,
        Pollutant::Co,
        Pollutant::So2,
        Pollutant::O3,
        Pollutant::Benzene,
        Pollutant::Toluene,
        Pollutant::Xylene,
    ];

    /// Pollutants forecast by the trend and comparison pipelines
    pub const FORECAST_SET: [Pollutant; 10] = [
        Pollutant::Pm25,
        Pollutant::No,
        Pollutant::No2,
        Pollutant::Nox,
        Pollutant::Nh3,
        Pollutant::Co,
        Pollutant::So2,
        Pollutant::O3,
        Pollutant::Benzene,
        Pollutant::Toluene,
    ];

    /// Column name in the source CSV
    pub const fn column(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No => "NO",
            Pollutant::No2 => "NO2",
            Pollutant::Nox => "NOx",
            Pollutant::Nh3 => "NH3",
            Pollutant::Co => "CO",
            Pollutant::So2 => "SO2",
            Pollutant::O3 => "O3",
            Pollutant::Benzene => "Benzene",
            Pollutant::Toluene => "Toluene",
            Pollutant::Xylene => "Xylene",
        }
    }

    /// Position in [`Pollutant::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.column() == name.trim())
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column())
    }
}

impl FromStr for Pollutant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_column(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|p| p.column().eq_ignore_ascii_case(s.trim()))
            })
            .ok_or_else(|| format!("unknown pollutant '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (i, p) in Pollutant::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn test_column_round_trip() {
        for p in Pollutant::ALL {
            assert_eq!(Pollutant::from_column(p.column()), Some(p));
        }
        assert_eq!(Pollutant::from_column("AQI"), None);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("pm2.5".parse::<Pollutant>(), Ok(Pollutant::Pm25));
        assert_eq!("nox".parse::<Pollutant>(), Ok(Pollutant::Nox));
        assert!("radon".parse::<Pollutant>().is_err());
    }

    #[test]
    fn test_forecast_set_excludes_pm10_and_xylene() {
        assert!(!Pollutant::FORECAST_SET.contains(&Pollutant::Pm10));
        assert!(!Pollutant::FORECAST_SET.contains(&Pollutant::Xylene));
        assert_eq!(Pollutant::FORECAST_SET.len(), 10);
    }
}

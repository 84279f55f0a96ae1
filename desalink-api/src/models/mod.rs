mod ingest;
mod logger;
mod realtime;
mod record;

pub use ingest::*;
pub use logger::*;
pub use realtime::*;
pub use record::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorFamily {
    /// Air and water temperature probes, T1..T15
    Temperature,
    /// Relative humidity probes, RH1..RH7
    Humidity,
    /// Water level gauges, WL1..WL9. Realtime only, never persisted
    WaterLevel,
    /// Load cells, WW1..WW9
    WaterWeight,
}

impl SensorFamily {
    pub const ALL: [SensorFamily; 4] = [
        SensorFamily::Temperature,
        SensorFamily::Humidity,
        SensorFamily::WaterLevel,
        SensorFamily::WaterWeight,
    ];

    /// Families the background logger is allowed to write to durable storage.
    pub const PERSISTABLE: [SensorFamily; 3] = [
        SensorFamily::Temperature,
        SensorFamily::Humidity,
        SensorFamily::WaterWeight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorFamily::Temperature => "temperature",
            SensorFamily::Humidity => "humidity",
            SensorFamily::WaterLevel => "waterLevel",
            SensorFamily::WaterWeight => "waterWeight",
        }
    }

    pub fn is_persistable(&self) -> bool {
        !matches!(self, SensorFamily::WaterLevel)
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("Unknown sensor type: {s}"))
    }
}

/// Freshness of a cached reading, derived on read from its receipt time.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Inactive,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Active => "active",
            SensorStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SensorStatus::Active)
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveStatus {
    Open,
    #[default]
    Closed,
}

impl ValveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValveStatus::Open => "open",
            ValveStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ValveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human readable outcome
    pub message: String,
}

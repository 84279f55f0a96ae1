use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SensorFamily;
use crate::identity::SensorId;

/// Per-family selection as sent by clients.
///
/// Accepts `true`/`"all"`, `false`/`"none"`, or one sensor identifier.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionInput {
    Flag(bool),
    Name(String),
}

impl From<bool> for SelectionInput {
    fn from(value: bool) -> Self {
        SelectionInput::Flag(value)
    }
}

impl From<&str> for SelectionInput {
    fn from(value: &str) -> Self {
        SelectionInput::Name(value.to_string())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerStartRequest {
    /// Humidity selection, `all` when omitted
    pub humidity: Option<SelectionInput>,
    /// Temperature selection, `all` when omitted
    pub temperature: Option<SelectionInput>,
    /// Water weight selection, `all` when omitted
    pub water_weight: Option<SelectionInput>,
    /// Water level is realtime only; any value is rejected
    pub water_level: Option<SelectionInput>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfigRequest {
    /// New sampling interval in milliseconds
    pub interval: Option<u64>,
    /// New humidity selection
    pub humidity: Option<SelectionInput>,
    /// New temperature selection
    pub temperature: Option<SelectionInput>,
    /// New water weight selection
    pub water_weight: Option<SelectionInput>,
    /// Water level is realtime only; any value is rejected
    pub water_level: Option<SelectionInput>,
}

impl LoggerConfigRequest {
    pub fn selections(&self) -> impl Iterator<Item = (SensorFamily, &SelectionInput)> {
        [
            (SensorFamily::Humidity, self.humidity.as_ref()),
            (SensorFamily::Temperature, self.temperature.as_ref()),
            (SensorFamily::WaterWeight, self.water_weight.as_ref()),
            (SensorFamily::WaterLevel, self.water_level.as_ref()),
        ]
        .into_iter()
        .filter_map(|(family, input)| input.map(|input| (family, input)))
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_none() && self.selections().next().is_none()
    }
}

impl From<LoggerStartRequest> for LoggerConfigRequest {
    fn from(request: LoggerStartRequest) -> Self {
        let all = || Some(SelectionInput::from("all"));

        Self {
            interval: None,
            humidity: request.humidity.or_else(all),
            temperature: request.temperature.or_else(all),
            water_weight: request.water_weight.or_else(all),
            water_level: request.water_level,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerStatus {
    /// Whether the periodic timer is armed
    pub is_logging: bool,
    /// Sampling interval in milliseconds
    pub interval: u64,
    /// Completed cycles since the last start
    pub log_count: u64,
    /// Families with a non-empty selection
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub enabled_sensor_types: BTreeMap<SensorFamily, bool>,
    /// Sensors iterated on each cycle, per family
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub active_sensors: BTreeMap<SensorFamily, Vec<SensorId>>,
    /// Selection label per family: `all`, `none` or an identifier
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub selection: BTreeMap<SensorFamily, String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct LoggerResponse {
    /// Human readable outcome
    pub message: String,
    /// Logger state after the operation
    pub status: LoggerStatus,
}

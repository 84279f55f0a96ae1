use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use super::ValveStatus;
use crate::identity::SensorId;

/// Latest value per sensor, keyed by identifier.
pub type ReadingMap<T> = BTreeMap<SensorId, T>;

/// Dashboard view of the realtime cache.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeResponse {
    /// Relative humidity per probe
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub humidity: ReadingMap<f64>,
    /// Air temperature probes, T1..T7
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub air_temperature: ReadingMap<f64>,
    /// Water temperature probes, T8..T15
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_temperature: ReadingMap<f64>,
    /// Water level per gauge
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_level: ReadingMap<f64>,
    /// Load cell output per cell
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_weight: ReadingMap<f64>,
    /// Liveness of every cached sensor
    pub sensor_status: SensorStatusMap,
    /// Last valve report
    pub valve: ValveSnapshot,
    /// Time of the last accepted report of any kind
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Time the view was produced
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatusMap {
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub humidity: ReadingMap<bool>,
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub air_temperature: ReadingMap<bool>,
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_temperature: ReadingMap<bool>,
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_level: ReadingMap<bool>,
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub water_weight: ReadingMap<bool>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ValveSnapshot {
    /// Valve position
    pub status: ValveStatus,
    /// Device specific level reading
    pub level: f64,
    /// Capture time of the report, absent until the first report
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheCounts {
    pub temperature_sensors: usize,
    pub humidity_sensors: usize,
    pub water_level_sensors: usize,
    pub water_weight_sensors: usize,
    pub total_sensors: usize,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatusResponse {
    /// Always `online` while the process serves requests
    pub status: String,
    /// Cached sensor count per family
    pub cache: CacheCounts,
    /// Time of the last accepted report of any kind
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Process uptime in seconds
    pub uptime: u64,
    /// Time the status was produced
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushResponse {
    /// False when at least one record failed to persist
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Number of records written
    pub saved_count: usize,
    /// Number of records that failed
    pub failed_count: usize,
    /// Time of the flush
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::SensorStatus;

/// Filter for stored sensor data. Filters are applied in priority order:
/// sensor id, then sensor type, then time range, then latest.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema, utoipa::IntoParams))]
#[cfg_attr(feature = "docs", into_params(parameter_in = Query))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorDataQuery {
    /// Maximum number of records, 100 when omitted
    pub limit: Option<i64>,
    /// Only records of this sensor; `all` disables the filter
    pub sensor_id: Option<String>,
    /// Only records of this family; `all` disables the filter
    pub sensor_type: Option<String>,
    /// Range start, requires `end`
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    /// Range end, requires `start`
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

impl SensorDataQuery {
    pub const DEFAULT_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit.filter(|limit| *limit > 0).unwrap_or(Self::DEFAULT_LIMIT)
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Human readable outcome
    pub message: String,
    /// Number of records removed
    pub deleted: u64,
}

/// Manually entered reading. Unit and status default from the family.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSensorDataRequest {
    /// Identifier such as `T5`
    pub sensor_id: Option<String>,
    /// Family tag, `temperature`, `humidity` or `waterWeight`
    pub sensor_type: Option<String>,
    pub value: Option<f64>,
    /// Overrides the family unit
    pub unit: Option<String>,
    /// `active` when omitted
    pub status: Option<SensorStatus>,
    /// Logger interval in whole seconds
    pub interval: Option<u32>,
    /// Capture time, now when omitted
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatusResponse {
    pub total_records: i64,
    /// Row count per stored type tag
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub records_by_type: BTreeMap<String, i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub oldest_record: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub newest_record: Option<OffsetDateTime>,
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::ValveStatus;
use crate::identity::SensorId;

/// Why a single batch entry was refused.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    BadIdentifierFormat,
    NonNumericValue,
    OutOfRange,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::BadIdentifierFormat => f.write_str("Invalid sensor ID format"),
            RejectReason::NonNumericValue => f.write_str("Invalid value (must be number)"),
            RejectReason::OutOfRange => f.write_str("Value out of range"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedReading {
    /// Validated sensor identifier
    #[cfg_attr(feature = "docs", schema(value_type = String))]
    pub sensor_id: SensorId,
    /// Cached value
    pub value: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedReading {
    /// Identifier as sent by the device
    pub sensor_id: String,
    /// Offending value, reported for out-of-range entries only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Rejection tag
    pub reason: RejectReason,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Always true; partial rejection is still a successful call
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Number of accepted entries
    pub received: usize,
    /// Number of rejected entries
    pub rejected: usize,
    /// Capture time stamped on every accepted entry
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Accepted entries
    pub sensors: Vec<AcceptedReading>,
    /// Rejected entries with their reason
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<RejectedReading>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValveResponse {
    /// Always true when the report was accepted
    pub success: bool,
    /// Human readable outcome
    pub message: String,
    /// Reported valve position
    pub status: ValveStatus,
    /// Reported valve level
    pub level: f64,
    /// Capture time of the report
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

use std::sync::Arc;

use desalink_api::models::{IngestResponse, SensorFamily, ValveResponse};
use desalink_api::{parse_valve, partition_batch};
use serde_json::Value;

use crate::errors::IngestError;
use crate::services::cache_service::CacheService;
use crate::services::clock::Clock;

/// Validates device pushes and writes the accepted part into the cache.
pub struct IngestService {
    cache: Arc<CacheService>,
    clock: Arc<dyn Clock>,
}

impl IngestService {
    pub fn new(cache: Arc<CacheService>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    /// Accepts an `{identifier: value}` object for one family.
    ///
    /// Bad entries are reported back and skipped; only an empty or non-object
    /// payload fails the whole call.
    pub async fn ingest_batch(&self, family: SensorFamily, payload: &Value) -> Result<IngestResponse, IngestError> {
        let entries = payload
            .as_object()
            .filter(|entries| !entries.is_empty())
            .ok_or(IngestError::EmptyPayload(family))?;

        let timestamp = self.clock.now_utc();
        let partition = partition_batch(family, entries);

        self.cache
            .upsert_batch(family, &partition.accepted, timestamp)
            .await;

        let received = partition.accepted.len();
        let rejected = partition.rejected.len();

        if rejected > 0 {
            tracing::warn!(%family, received, rejected, invalid = ?partition.rejected, "rejected part of a sensor batch");
        } else {
            tracing::debug!(%family, received, "sensor batch cached");
        }

        let message = match rejected {
            0 => format!("{family} data received"),
            _ => format!("{family} data received, {rejected} invalid entries skipped"),
        };

        Ok(IngestResponse {
            success: true,
            message,
            received,
            rejected,
            timestamp,
            sensors: partition.accepted,
            invalid: partition.rejected,
        })
    }

    /// Replaces the valve slot; an invalid report leaves it untouched.
    pub async fn ingest_valve(&self, payload: &Value) -> Result<ValveResponse, IngestError> {
        let report = parse_valve(payload).inspect_err(|rejection| {
            tracing::warn!(%rejection, "valve report rejected");
        })?;

        let timestamp = self.clock.now_utc();
        self.cache
            .set_valve(report.status, report.level, timestamp)
            .await;

        tracing::debug!(status = %report.status, level = report.level, "valve state cached");

        Ok(ValveResponse {
            success: true,
            message: "Valve status received".to_string(),
            status: report.status,
            level: report.level,
            timestamp,
        })
    }
}

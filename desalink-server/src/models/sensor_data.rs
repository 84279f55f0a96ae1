use desalink_api::SensorId;
use desalink_api::models::{SensorFamily, SensorStatus};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use super::Table;

/// A persisted sample of one sensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct SensorData {
    pub id: i64,
    /// Identifier such as `T5`
    pub sensor_id: String,
    /// Family tag; air and water temperature share `temperature`
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    /// Liveness of the reading when it was sampled
    pub status: String,
    /// Logger interval in whole seconds, absent for manual saves
    pub interval_seconds: Option<i64>,
    /// Capture time of the reading
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

/// A reading on its way to durable storage.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSensorData {
    pub sensor_id: SensorId,
    pub sensor_type: SensorFamily,
    pub value: f64,
    pub unit: String,
    pub status: SensorStatus,
    pub interval_seconds: Option<u32>,
    pub time: OffsetDateTime,
}

impl NewSensorData {
    /// Builds a record for `sensor_id`, rounding the value to two decimals.
    ///
    /// The time is stored at UTC so stored rows compare in time order.
    pub fn new(
        sensor_id: SensorId,
        value: f64,
        status: SensorStatus,
        interval_seconds: Option<u32>,
        time: OffsetDateTime,
    ) -> Self {
        let sensor_type = sensor_id.family();

        Self {
            sensor_id,
            sensor_type,
            value: (value * 100.0).round() / 100.0,
            unit: sensor_type.unit().to_string(),
            status,
            interval_seconds,
            time: time.to_offset(UtcOffset::UTC),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

#[derive(Clone)]
pub struct SensorDataTable;

impl Table for SensorDataTable {
    fn name(&self) -> &'static str {
        "sensor_data"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sensor_id TEXT NOT NULL,
                sensor_type TEXT NOT NULL,
                value REAL NOT NULL,
                unit TEXT NOT NULL,
                status TEXT NOT NULL,
                interval_seconds INTEGER,
                time TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sensor_data_sensor_time ON sensor_data (sensor_id, time);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_data;")
    }
}

//! In-memory test doubles for the durable store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::StorageError;
use crate::models::{NewSensorData, SensorData};
use crate::repositories::DurableStore;

pub use crate::services::ManualClock;

/// Keeps every record in a vector and can be told to stall or fail.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SensorData>>,
    delay: Option<Duration>,
    failing: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write sleeps for `delay` on the tokio clock before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Writes for `sensor_id` fail with `StorageError::Unavailable`.
    pub fn failing_on(mut self, sensor_id: &str) -> Self {
        self.failing.insert(sensor_id.to_string());
        self
    }

    pub async fn records(&self) -> Vec<SensorData> {
        self.records.lock().await.clone()
    }

    /// Highest number of writes observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn create_record(&self, record: &NewSensorData) -> Result<SensorData, StorageError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let sensor_id = record.sensor_id.to_string();
        let result = if self.failing.contains(&sensor_id) {
            Err(StorageError::Unavailable(format!("write refused for {sensor_id}")))
        } else {
            let mut records = self.records.lock().await;
            let stored = SensorData {
                id: records.len() as i64 + 1,
                sensor_id,
                sensor_type: record.sensor_type.as_str().to_string(),
                value: record.value,
                unit: record.unit.clone(),
                status: record.status.as_str().to_string(),
                interval_seconds: record.interval_seconds.map(i64::from),
                time: record.time,
            };
            records.push(stored.clone());
            Ok(stored)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

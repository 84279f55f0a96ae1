mod sensor_data;

pub use sensor_data::SensorDataRepository;

use async_trait::async_trait;

use crate::errors::StorageError;
use crate::models::{NewSensorData, SensorData};

/// Append-only sink for readings selected by the logger.
///
/// Each call stands alone; a failure is reported for that record only.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn create_record(&self, record: &NewSensorData) -> Result<SensorData, StorageError>;
}

pub mod identity;
pub mod models;

pub use identity::{BatchPartition, FamilyRule, SensorId, TemperatureZone, ValveRejection, ValveReport};
pub use identity::{parse_valve, partition_batch, validate_value};

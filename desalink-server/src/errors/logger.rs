use axum::http::StatusCode;
use desalink_api::models::SensorFamily;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoggerError {
    #[error("No valid configuration provided")]
    EmptyConfiguration,

    #[error("Interval must be between 1 and 86400000 milliseconds")]
    InvalidInterval,

    #[error("Invalid {family} selection: {value}")]
    InvalidSelection { family: SensorFamily, value: String },

    #[error("Sensor type {0} is realtime only and cannot be logged")]
    NotPersistable(SensorFamily),
}

impl LoggerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoggerError::EmptyConfiguration => StatusCode::BAD_REQUEST,
            LoggerError::InvalidInterval => StatusCode::BAD_REQUEST,
            LoggerError::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            LoggerError::NotPersistable(_) => StatusCode::BAD_REQUEST,
        }
    }
}

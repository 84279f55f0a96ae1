use axum::http::StatusCode;
use desalink_api::models::SensorFamily;

#[derive(Debug, thiserror::Error)]
pub enum SensorDataError {
    #[error("Data not found")]
    NotFound,

    #[error("Unknown sensor type: {0}")]
    UnknownSensorType(String),

    #[error("Both start and end are required for a time range")]
    IncompleteTimeRange,

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid sensor ID: {0}")]
    InvalidSensorId(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Sensor type {0} is realtime only and cannot be stored")]
    NotPersistable(SensorFamily),
}

impl SensorDataError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SensorDataError::NotFound => StatusCode::NOT_FOUND,
            SensorDataError::UnknownSensorType(_)
            | SensorDataError::IncompleteTimeRange
            | SensorDataError::MissingField(_)
            | SensorDataError::InvalidSensorId(_)
            | SensorDataError::InvalidInterval(_)
            | SensorDataError::NotPersistable(_) => StatusCode::BAD_REQUEST,
        }
    }
}
